use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::question_dto::{
        CreateQuestionPayload, DraftQuestionPayload, DraftQuestionResponse, QuestionListQuery,
        UpdateQuestionPayload,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/integration/questions",
    request_body = CreateQuestionPayload,
    responses(
        (status = 201, description = "Question created"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state.question_service.create(payload, claims.sub).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

#[utoipa::path(
    get,
    path = "/api/integration/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question found"),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let question = state.question_service.get_by_id(id).await?;
    Ok(Json(question))
}

#[utoipa::path(
    patch,
    path = "/api/integration/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    request_body = UpdateQuestionPayload,
    responses(
        (status = 200, description = "Question updated"),
        (status = 401, description = "Not the owning user"),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn update_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state
        .question_service
        .update(id, payload, claims.sub)
        .await?;
    Ok(Json(question))
}

#[utoipa::path(
    delete,
    path = "/api/integration/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 401, description = "Not the owning user")
    )
)]
#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.question_service.delete(id, claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.question_service.list(query).await?;
    Ok(Json(result))
}

/// Proxy to the remote text-generation service for drafting question text.
#[axum::debug_handler]
pub async fn draft_question(
    State(state): State<AppState>,
    Json(payload): Json<DraftQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let text = state
        .generation_service
        .generate(
            &payload.prompt,
            payload.max_tokens.unwrap_or(300),
            payload.temperature.unwrap_or(0.7),
        )
        .await?;
    Ok(Json(DraftQuestionResponse { text }))
}
