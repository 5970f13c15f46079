// src/models/question.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,

    /// Awarded in full for a correct answer, otherwise nothing.
    pub points: Decimal,
    pub display_order: i32,

    /// Points at one of this question's own options, or nothing yet.
    pub correct_option_id: Option<i64>,
}

/// Represents the 'options' table in the database.
/// Named `QuizOption` to stay clear of `std::option::Option`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub display_order: i32,
}

/// A question together with its options, as loaded for grading or display.
#[derive(Debug, Clone)]
pub struct QuestionWithOptions {
    pub question: Question,
    pub options: Vec<QuizOption>,
}

/// Author view of a question (exposes the correct option).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorQuestion {
    pub id: i64,
    pub text: String,
    pub points: Decimal,
    pub display_order: i32,
    pub correct_option_id: Option<i64>,
    pub options: Vec<QuizOption>,
}

impl From<QuestionWithOptions> for AuthorQuestion {
    fn from(item: QuestionWithOptions) -> Self {
        Self {
            id: item.question.id,
            text: item.question.text,
            points: item.question.points,
            display_order: item.question.display_order,
            correct_option_id: item.question.correct_option_id,
            options: item.options,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewOption {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
}

/// DTO for adding a question with its full option set.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    pub points: Option<Decimal>,
    #[validate(length(min = 2, message = "A question needs at least two options."), nested)]
    pub options: Vec<NewOption>,
    /// Zero-based index into `options`.
    pub correct_option_index: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCreated {
    pub question_id: i64,
    pub option_ids: Vec<i64>,
    pub correct_option_id: i64,
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: Option<String>,
    pub points: Option<Decimal>,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
    pub points: Decimal,
}

/// DTO for adding or renaming an option.
#[derive(Debug, Deserialize, Validate)]
pub struct OptionTextRequest {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
}

/// `correctOptionId` must be present; an explicit `null` clears the pointer.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetCorrectOptionRequest {
    // Absent is rejected; null is accepted.
    #[serde(deserialize_with = "Option::deserialize")]
    #[validate(range(min = 1))]
    pub correct_option_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectOptionResponse {
    pub question_id: i64,
    pub correct_option_id: Option<i64>,
}
