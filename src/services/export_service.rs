use crate::dto::oral_exam_dto::OralExamDetail;
use crate::error::Result;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

pub struct ExportService;

impl ExportService {
    /// One worksheet per group: a row per (student, round) assignment with
    /// the question text and evaluation outcome.
    pub fn generate_assignment_xlsx(detail: &OralExamDetail) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();

        let header_bg = Color::RGB(0x0F172A);
        let border_color = Color::RGB(0xE2E8F0);
        let alt_row = Color::RGB(0xF8FAFC);

        let eval_pending = Color::RGB(0xF59E0B);
        let eval_passed = Color::RGB(0x10B981);
        let eval_failed = Color::RGB(0xEF4444);

        let title_format = Format::new()
            .set_font_size(14)
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(header_bg)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);

        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        let columns = [
            ("Student #", 10.0),
            ("Name", 28.0),
            ("Round", 8.0),
            ("Question", 70.0),
            ("Evaluation", 12.0),
        ];

        for group in &detail.groups {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(format!("Group {}", group.group.group_number))?;

            for (i, (_, width)) in columns.iter().enumerate() {
                worksheet.set_column_width(i as u16, *width)?;
            }

            let title = format!(
                "{} - group {} ({} students)",
                detail.set.title, group.group.group_number, group.group.student_count
            );
            worksheet.set_row_height(0, 28)?;
            worksheet.merge_range(0, 0, 0, (columns.len() - 1) as u16, &title, &title_format)?;

            for (i, (name, _)) in columns.iter().enumerate() {
                worksheet.write_string_with_format(1, i as u16, *name, &header_format)?;
            }

            let mut row: u32 = 2;
            for student in &group.students {
                for assignment in &student.assignments {
                    let bg = if row % 2 == 0 { alt_row } else { Color::White };
                    let base_fmt = Format::new()
                        .set_font_size(10)
                        .set_background_color(bg)
                        .set_border(FormatBorder::Thin)
                        .set_border_color(border_color);
                    let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);
                    let wrap_fmt = base_fmt.clone().set_text_wrap();

                    worksheet.write_number_with_format(
                        row,
                        0,
                        student.student.student_number as f64,
                        &center_fmt,
                    )?;
                    worksheet.write_string_with_format(
                        row,
                        1,
                        student.student.full_name.as_deref().unwrap_or(""),
                        &base_fmt,
                    )?;
                    worksheet.write_number_with_format(
                        row,
                        2,
                        assignment.round_order as f64,
                        &center_fmt,
                    )?;
                    worksheet.write_string_with_format(
                        row,
                        3,
                        &assignment.question_text,
                        &wrap_fmt,
                    )?;

                    let eval_color = match assignment.evaluation.as_str() {
                        "passed" => eval_passed,
                        "failed" => eval_failed,
                        _ => eval_pending,
                    };
                    let eval_fmt = Format::new()
                        .set_font_size(10)
                        .set_bold()
                        .set_font_color(Color::White)
                        .set_background_color(eval_color)
                        .set_align(FormatAlign::Center)
                        .set_border(FormatBorder::Thin)
                        .set_border_color(border_color);
                    worksheet.write_string_with_format(
                        row,
                        4,
                        &assignment.evaluation,
                        &eval_fmt,
                    )?;

                    row += 1;
                }
            }

            worksheet.set_freeze_panes(2, 0)?;
        }

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}
