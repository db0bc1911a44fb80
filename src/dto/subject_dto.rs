use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSubjectPayload {
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTopicPayload {
    pub subject_id: Uuid,
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSubtopicPayload {
    pub topic_id: Uuid,
    #[validate(length(min = 1))]
    pub name: String,
}
