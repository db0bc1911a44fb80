pub mod oral_exam_dto;
pub mod question_dto;
pub mod subject_dto;
