// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{attempt::SubmitAttemptRequest, quiz::EntityLookupQuery},
    services::{attempt, play, stats},
    utils::{
        jwt::Claims,
        pagination::{PageQuery, Pagination},
    },
};

/// Returns a quiz for playing. Correct answers are never included.
pub async fn get_quiz_for_play(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = play::quiz_for_play(&pool, quiz_id).await?;
    Ok(Json(quiz))
}

/// Returns the quiz embedded in a lesson or chapter.
pub async fn get_quiz_for_entity(
    State(pool): State<PgPool>,
    Path(entity_id): Path<i64>,
    Query(query): Query<EntityLookupQuery>,
) -> Result<impl IntoResponse, AppError> {
    if entity_id <= 0 {
        return Err(AppError::InvalidInput(
            "entityId must be a positive integer".to_string(),
        ));
    }

    let quiz = play::quiz_for_play_by_entity(&pool, entity_id, query.entity_type).await?;
    Ok(Json(quiz))
}

/// Starts an attempt for the calling user.
pub async fn start_attempt(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.user_id()?;

    let started = attempt::start_attempt(&pool, quiz_id, student_id).await?;
    Ok((StatusCode::CREATED, Json(started)))
}

/// Submits answers for the caller's own attempt.
///
/// * Validates the payload shape.
/// * Grades against the quiz as it currently stands.
/// * A second submission of the same attempt is rejected with 422.
pub async fn submit_attempt(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let student_id = claims.user_id()?;

    let result = attempt::submit_attempt(&pool, attempt_id, student_id, &payload.answers).await?;
    Ok(Json(result))
}

/// Students see their own attempts only; authors see any.
pub async fn get_attempt(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let owner = if claims.is_author() {
        None
    } else {
        Some(claims.user_id()?)
    };

    let detail = attempt::get_attempt(&pool, attempt_id, owner).await?;
    Ok(Json(detail))
}

/// Attempt history of a student, newest first.
pub async fn list_student_attempts(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(student_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    if !claims.is_author() && claims.user_id()? != student_id {
        return Err(AppError::Forbidden(
            "Cannot list another student's attempts".to_string(),
        ));
    }
    let pagination = Pagination::try_from(query)?;

    let page = stats::list_student_attempts(&pool, student_id, pagination).await?;
    Ok(Json(page))
}
