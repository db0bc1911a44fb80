pub mod oral_exam;
pub mod question;
pub mod subject;
