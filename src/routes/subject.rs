use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::subject_dto::{CreateSubjectPayload, CreateSubtopicPayload, CreateTopicPayload},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn create_subject(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateSubjectPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let subject = state
        .subject_service
        .create_subject(&payload.name, claims.sub)
        .await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

#[axum::debug_handler]
pub async fn list_subjects(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let subjects = state.subject_service.list_subjects(Some(claims.sub)).await?;
    Ok(Json(subjects))
}

#[axum::debug_handler]
pub async fn create_topic(
    State(state): State<AppState>,
    Json(payload): Json<CreateTopicPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let topic = state
        .subject_service
        .create_topic(payload.subject_id, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

#[axum::debug_handler]
pub async fn list_topics(
    State(state): State<AppState>,
    Path(subject_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let topics = state.subject_service.list_topics(subject_id).await?;
    Ok(Json(topics))
}

#[axum::debug_handler]
pub async fn create_subtopic(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubtopicPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let subtopic = state
        .subject_service
        .create_subtopic(payload.topic_id, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(subtopic)))
}

#[axum::debug_handler]
pub async fn list_subtopics(
    State(state): State<AppState>,
    Path(topic_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let subtopics = state.subject_service.list_subtopics(topic_id).await?;
    Ok(Json(subtopics))
}
