use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A bank question. `subtopic_id` is optional; questions without one are
/// pooled under their topic during oral-exam assignment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub topic_id: Uuid,
    pub subtopic_id: Option<Uuid>,
    pub difficulty: String,
    pub text: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
