use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One oral-exam configuration. Immutable after creation except deletion,
/// which cascades to groups, students and their assigned questions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OralExamSet {
    pub id: Uuid,
    pub title: String,
    pub subject_id: Uuid,
    pub topic_ids: Vec<Uuid>,
    pub total_students: i32,
    pub num_groups: i32,
    pub students_per_group: i32,
    pub questions_per_student: i32,
    pub seed: i64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OralExamGroup {
    pub id: Uuid,
    pub set_id: Uuid,
    pub group_number: i32,
    pub student_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OralExamStudent {
    pub id: Uuid,
    pub group_id: Uuid,
    pub student_number: i32,
    pub full_name: Option<String>,
}

/// A (student, question, round) assignment. `evaluation` is one of
/// `pending`, `passed`, `failed`, set by the examiner after the oral.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OralExamStudentQuestion {
    pub id: Uuid,
    pub student_id: Uuid,
    pub question_id: Uuid,
    pub round_order: i32,
    pub evaluation: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const EVALUATION_STATUSES: &[&str] = &["pending", "passed", "failed"];
