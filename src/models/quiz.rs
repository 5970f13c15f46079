// src/models/quiz.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::question::AuthorQuestion;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i64,
    pub title: Option<String>,

    /// Kind of content node the quiz hangs off ('Lesson' or 'Chapter').
    /// The node itself lives outside this service.
    pub entity_type: Option<String>,
    pub entity_id: i64,

    /// Advisory only; nothing here enforces it.
    pub time_limit_sec: Option<i32>,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Closed set of content nodes a quiz can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Lesson,
    Chapter,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Lesson => "Lesson",
            EntityType::Chapter => "Chapter",
        }
    }
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub entity_type: Option<EntityType>,
    #[validate(range(min = 1, message = "entityId must be a positive integer."))]
    pub entity_id: i64,
    #[validate(range(min = 1))]
    pub time_limit_sec: Option<i32>,
    pub is_active: Option<bool>,
}

/// DTO for updating a quiz. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub entity_type: Option<EntityType>,
    #[validate(range(min = 1, message = "entityId must be a positive integer."))]
    pub entity_id: Option<i64>,
    #[validate(range(min = 1))]
    pub time_limit_sec: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateQuizRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.entity_type.is_none()
            && self.entity_id.is_none()
            && self.time_limit_sec.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishQuizRequest {
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishQuizResponse {
    pub id: i64,
    pub is_active: bool,
}

/// Author view of a quiz, including the correct-option pointers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<AuthorQuestion>,
}

/// Learner view of a quiz. Carries no correctness data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayQuiz {
    pub id: i64,
    pub title: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: i64,
    pub time_limit_sec: Option<i32>,
    pub questions: Vec<PlayQuestion>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayQuestion {
    pub id: i64,
    pub text: String,
    pub points: Decimal,
    pub options: Vec<PlayOption>,
}

#[derive(Debug, Serialize)]
pub struct PlayOption {
    pub id: i64,
    pub text: String,
}

/// Query string for the content-node lookup.
#[derive(Debug, Default, Deserialize)]
pub struct EntityLookupQuery {
    pub entity_type: Option<EntityType>,
}
