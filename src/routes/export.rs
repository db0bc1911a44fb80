use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{error::Result, services::export_service::ExportService, AppState};

/// Export an oral exam's assignment sheets as XLSX, one worksheet per group.
pub async fn export_oral_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let detail = state.oral_exam_service.get_detail(id).await?;
    let buffer = ExportService::generate_assignment_xlsx(&detail)?;

    let filename = format!(
        "oral_exam_{}_{}.xlsx",
        detail.set.title.replace(' ', "_"),
        chrono::Utc::now().format("%Y%m%d")
    );
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}
