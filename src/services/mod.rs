pub mod allocation;
pub mod export_service;
pub mod generation_service;
pub mod oral_exam_service;
pub mod question_service;
pub mod subject_service;
