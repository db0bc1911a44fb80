use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionPayload {
    pub subject_id: Uuid,
    pub topic_id: Uuid,
    pub subtopic_id: Option<Uuid>,
    /// One of easy / medium / hard. Defaults to medium.
    pub difficulty: Option<String>,
    #[validate(length(min = 1))]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateQuestionPayload {
    pub subtopic_id: Option<Uuid>,
    pub difficulty: Option<String>,
    #[validate(length(min = 1))]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub subject_id: Option<Uuid>,
    pub topic_id: Option<Uuid>,
    pub subtopic_id: Option<Uuid>,
    pub difficulty: Option<String>,
    pub created_by: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DraftQuestionPayload {
    #[validate(length(min = 1))]
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DraftQuestionResponse {
    pub text: String,
}
