// src/models/attempt.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'quiz_attempts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,

    /// Always computed by the server when the attempt is sealed.
    pub score: Decimal,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub duration_sec: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttemptStatus {
    InProgress,
    Submitted,
}

impl QuizAttempt {
    /// `submitted_at` is the single witness of the lifecycle state.
    pub fn status(&self) -> AttemptStatus {
        match self.submitted_at {
            Some(_) => AttemptStatus::Submitted,
            None => AttemptStatus::InProgress,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptStarted {
    pub attempt_id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub started_at: DateTime<Utc>,
}

/// One answer in a submission. Omitting `selectedOptionId` leaves the question unanswered.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    #[validate(range(min = 1))]
    pub question_id: i64,
    #[validate(range(min = 1))]
    pub selected_option_id: Option<i64>,
}

/// DTO for submitting a quiz attempt. The student comes from the token, never the body.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    #[validate(length(min = 1, message = "At least one answer is required."), nested)]
    pub answers: Vec<AnswerInput>,
}

/// Grading outcome for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub is_correct: bool,
    pub points_awarded: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub attempt_id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub score: Decimal,
    pub submitted_at: DateTime<Utc>,
    pub duration_sec: i32,
    pub answers: Vec<GradedAnswer>,
}

/// Answer row joined with the question and the chosen option for review screens.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReview {
    pub question_id: i64,
    pub question_text: String,
    pub question_points: Decimal,
    pub selected_option_id: Option<i64>,
    pub selected_option_text: Option<String>,
    pub is_correct: bool,
    pub points_awarded: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptDetail {
    #[serde(flatten)]
    pub attempt: QuizAttempt,
    pub status: AttemptStatus,
    pub quiz_title: Option<String>,
    pub answers: Vec<AnswerReview>,
}

/// Row of the student's own attempt history.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttemptEntry {
    pub id: i64,
    pub quiz_id: i64,
    pub quiz_title: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: i64,
    pub score: Decimal,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub duration_sec: Option<i32>,
}
