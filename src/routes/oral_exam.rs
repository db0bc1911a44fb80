use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::oral_exam_dto::{
        CreateOralExamPayload, CreateOralExamResponse, EvaluatePayload, ExchangePayload,
        UpdateStudentPayload,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

/// Validates the configuration, assigns questions and persists everything
/// atomically. Configuration problems come back as 400s before any row is
/// written.
#[axum::debug_handler]
pub async fn create_oral_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateOralExamPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (detail, warnings) = state.oral_exam_service.create(&payload, claims.sub).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateOralExamResponse { detail, warnings }),
    ))
}

/// Dry run over the same allocation pipeline as creation.
#[axum::debug_handler]
pub async fn validate_oral_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateOralExamPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let report = state.oral_exam_service.validate(&payload, claims.sub).await?;
    Ok(Json(report))
}

#[axum::debug_handler]
pub async fn get_oral_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let detail = state.oral_exam_service.get_detail(id).await?;
    Ok(Json(detail))
}

#[axum::debug_handler]
pub async fn list_oral_exams(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let sets = state.oral_exam_service.list(Some(claims.sub)).await?;
    Ok(Json(sets))
}

#[axum::debug_handler]
pub async fn delete_oral_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let deleted = state.oral_exam_service.delete(id, claims.sub).await?;
    if !deleted {
        return Err(crate::error::Error::NotFound(
            "Oral exam set not found".to_string(),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn update_student(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStudentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let student = state
        .oral_exam_service
        .update_student_name(id, &payload.full_name, claims.sub)
        .await?;
    Ok(Json(student))
}

#[axum::debug_handler]
pub async fn list_alternatives(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let alternatives = state.oral_exam_service.alternatives(id).await?;
    Ok(Json(json!({ "items": alternatives })))
}

#[axum::debug_handler]
pub async fn exchange_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExchangePayload>,
) -> Result<impl IntoResponse> {
    let updated = state
        .oral_exam_service
        .exchange(id, payload.replacement_question_id, claims.sub)
        .await?;
    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn evaluate_assignment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EvaluatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let updated = state
        .oral_exam_service
        .evaluate(id, &payload.evaluation, claims.sub)
        .await?;
    Ok(Json(updated))
}
