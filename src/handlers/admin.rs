// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        question::{AddQuestionRequest, OptionTextRequest, SetCorrectOptionRequest, UpdateQuestionRequest},
        quiz::{CreateQuizRequest, PublishQuizRequest, UpdateQuizRequest},
    },
    services::{authoring, stats},
    utils::pagination::{PageQuery, Pagination},
};

/// Creates a new quiz.
/// Author only.
pub async fn create_quiz(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let quiz = authoring::create_quiz(&pool, payload).await?;

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Returns a quiz with all questions, options and correct answers.
/// Author only.
pub async fn get_quiz(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let detail = authoring::get_quiz_detail(&pool, quiz_id).await?;
    Ok(Json(detail))
}

/// Updates quiz fields that are present in the payload.
pub async fn update_quiz(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let quiz = authoring::update_quiz(&pool, quiz_id, payload).await?;
    Ok(Json(quiz))
}

/// Deletes a quiz and everything hanging off it.
pub async fn delete_quiz(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    authoring::delete_quiz(&pool, quiz_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn publish_quiz(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<PublishQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = authoring::publish_quiz(&pool, quiz_id, payload.is_active).await?;
    Ok(Json(result))
}

/// Adds a question with its options and the index of the correct one.
pub async fn add_question(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<AddQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = authoring::add_question(&pool, quiz_id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_questions(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let questions = authoring::list_questions(&pool, quiz_id).await?;
    Ok(Json(questions))
}

pub async fn update_question(
    State(pool): State<PgPool>,
    Path(question_id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let question = authoring::update_question(&pool, question_id, payload).await?;
    Ok(Json(question))
}

pub async fn add_option(
    State(pool): State<PgPool>,
    Path(question_id): Path<i64>,
    Json(payload): Json<OptionTextRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let option = authoring::add_option(&pool, question_id, &payload.text).await?;
    Ok((StatusCode::CREATED, Json(option)))
}

pub async fn update_option(
    State(pool): State<PgPool>,
    Path(option_id): Path<i64>,
    Json(payload): Json<OptionTextRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let option = authoring::update_option(&pool, option_id, &payload.text).await?;
    Ok(Json(option))
}

/// Deletes an option. Refused with 409 while it is a question's correct answer.
pub async fn delete_option(
    State(pool): State<PgPool>,
    Path(option_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    authoring::delete_option(&pool, option_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_correct_option(
    State(pool): State<PgPool>,
    Path(question_id): Path<i64>,
    Json(payload): Json<SetCorrectOptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let result =
        authoring::set_correct_option(&pool, question_id, payload.correct_option_id).await?;
    Ok(Json(result))
}

/// Lists attempts on a quiz, newest first.
pub async fn list_quiz_attempts(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = Pagination::try_from(query)?;

    let page = stats::list_quiz_attempts(&pool, quiz_id, pagination).await?;
    Ok(Json(page))
}

pub async fn quiz_stats(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let stats = stats::quiz_stats(&pool, quiz_id).await?;
    Ok(Json(stats))
}
