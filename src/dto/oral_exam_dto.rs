use crate::models::oral_exam::{OralExamGroup, OralExamSet, OralExamStudent};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOralExamPayload {
    #[validate(length(min = 1))]
    pub title: String,
    pub subject_id: Uuid,
    #[validate(length(min = 1))]
    pub topic_ids: Vec<Uuid>,
    #[validate(range(min = 1, max = 500))]
    pub total_students: i32,
    #[validate(range(min = 1, max = 100))]
    pub num_groups: i32,
    #[validate(range(min = 1, max = 50))]
    pub students_per_group: i32,
    #[validate(range(min = 1, max = 20))]
    pub questions_per_student: i32,
    /// Reproduces the exact same assignment when fixed. Defaults to 0, and
    /// the default is shared by validation and creation.
    pub seed: Option<i64>,
}

/// Dry-run result. Errors surface through the error taxonomy instead; a
/// report is only produced for configurations that would succeed.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub group_sizes: Vec<i32>,
    pub seats: i32,
    pub subtopics_available: usize,
    pub questions_available: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OralExamDetail {
    #[serde(flatten)]
    pub set: OralExamSet,
    pub groups: Vec<GroupDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: OralExamGroup,
    pub students: Vec<StudentDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentDetail {
    #[serde(flatten)]
    pub student: OralExamStudent,
    pub assignments: Vec<AssignmentDetail>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AssignmentDetail {
    pub id: Uuid,
    pub student_id: Uuid,
    pub question_id: Uuid,
    pub round_order: i32,
    pub evaluation: String,
    pub question_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOralExamResponse {
    #[serde(flatten)]
    pub detail: OralExamDetail,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStudentPayload {
    #[validate(length(min = 1))]
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangePayload {
    /// Chosen from the alternatives list; first candidate when omitted.
    pub replacement_question_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EvaluatePayload {
    #[validate(length(min = 1))]
    pub evaluation: String,
}
