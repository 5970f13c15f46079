// src/services/store.rs

//! Reads shared by the authoring, play and attempt services.
//! Every function takes any Postgres executor so it can run on the pool or inside a transaction.

use rust_decimal::Decimal;
use sqlx::{FromRow, PgExecutor};

use crate::{
    error::AppError,
    models::{
        question::{Question, QuestionWithOptions, QuizOption},
        quiz::Quiz,
    },
};

/// Flat row of the question/option join.
#[derive(FromRow)]
struct QuestionOptionRow {
    id: i64,
    quiz_id: i64,
    text: String,
    points: Decimal,
    display_order: i32,
    correct_option_id: Option<i64>,
    option_id: Option<i64>,
    option_text: Option<String>,
    option_order: Option<i32>,
}

pub async fn fetch_quiz<'e, E>(executor: E, quiz_id: i64) -> Result<Option<Quiz>, AppError>
where
    E: PgExecutor<'e>,
{
    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, entity_type, entity_id, time_limit_sec,
               is_active, display_order, created_at, updated_at
        FROM quizzes
        WHERE id = $1
        "#,
    )
    .bind(quiz_id)
    .fetch_optional(executor)
    .await?;

    Ok(quiz)
}

/// Finds the quiz attached to a content node. When several share the node,
/// the lowest display order (then lowest id) wins.
pub async fn fetch_quiz_by_entity<'e, E>(
    executor: E,
    entity_id: i64,
    entity_type: Option<&str>,
) -> Result<Option<Quiz>, AppError>
where
    E: PgExecutor<'e>,
{
    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, entity_type, entity_id, time_limit_sec,
               is_active, display_order, created_at, updated_at
        FROM quizzes
        WHERE entity_id = $1
          AND ($2::TEXT IS NULL OR entity_type = $2)
        ORDER BY display_order ASC, id ASC
        LIMIT 1
        "#,
    )
    .bind(entity_id)
    .bind(entity_type)
    .fetch_optional(executor)
    .await?;

    Ok(quiz)
}

/// Loads every question of a quiz with its options, in display order.
///
/// One statement, so the question set and the option sets come from the same snapshot.
pub async fn fetch_questions_with_options<'e, E>(
    executor: E,
    quiz_id: i64,
) -> Result<Vec<QuestionWithOptions>, AppError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, QuestionOptionRow>(
        r#"
        SELECT
            qu.id,
            qu.quiz_id,
            qu.text,
            qu.points,
            qu.display_order,
            qu.correct_option_id,
            o.id AS option_id,
            o.text AS option_text,
            o.display_order AS option_order
        FROM questions qu
        LEFT JOIN options o ON o.question_id = qu.id
        WHERE qu.quiz_id = $1
        ORDER BY qu.display_order ASC, qu.id ASC, o.display_order ASC, o.id ASC
        "#,
    )
    .bind(quiz_id)
    .fetch_all(executor)
    .await?;

    Ok(group_rows(rows))
}

fn group_rows(rows: Vec<QuestionOptionRow>) -> Vec<QuestionWithOptions> {
    let mut questions: Vec<QuestionWithOptions> = Vec::new();

    for row in rows {
        let option = match (row.option_id, row.option_text) {
            (Some(id), Some(text)) => Some(QuizOption {
                id,
                question_id: row.id,
                text,
                display_order: row.option_order.unwrap_or_default(),
            }),
            _ => None,
        };

        match questions.last_mut() {
            Some(last) if last.question.id == row.id => last.options.extend(option),
            _ => questions.push(QuestionWithOptions {
                question: Question {
                    id: row.id,
                    quiz_id: row.quiz_id,
                    text: row.text,
                    points: row.points,
                    display_order: row.display_order,
                    correct_option_id: row.correct_option_id,
                },
                options: option.into_iter().collect(),
            }),
        }
    }

    questions
}
