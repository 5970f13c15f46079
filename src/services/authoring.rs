// src/services/authoring.rs

//! Quiz authoring: quizzes, questions, options and the correct-option pointer.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppError,
    models::{
        question::{
            AddQuestionRequest, AuthorQuestion, CorrectOptionResponse, QuestionCreated,
            QuestionSummary, QuizOption, UpdateQuestionRequest,
        },
        quiz::{CreateQuizRequest, PublishQuizResponse, Quiz, QuizDetail, UpdateQuizRequest},
    },
    services::store,
    utils::html::clean_html,
};

const QUIZ_RETURNING: &str = " RETURNING id, title, entity_type, entity_id, time_limit_sec, \
     is_active, display_order, created_at, updated_at";

/// `questions.points` is `NUMERIC(6, 2)`; anything from this bound up overflows.
const POINTS_BOUND: i64 = 10_000;

/// Points must fit the column exactly: positive, at most two decimals, below 10000.
fn ensure_valid_points(points: Decimal) -> Result<(), AppError> {
    if points <= Decimal::ZERO {
        return Err(AppError::InvalidInput("points must be positive".to_string()));
    }
    if points.normalize().scale() > 2 {
        return Err(AppError::InvalidInput(
            "points may have at most two decimal places".to_string(),
        ));
    }
    if points >= Decimal::from(POINTS_BOUND) {
        return Err(AppError::InvalidInput(format!(
            "points must be below {}",
            POINTS_BOUND
        )));
    }
    Ok(())
}

/// Creates a quiz attached to a content node.
pub async fn create_quiz(pool: &PgPool, req: CreateQuizRequest) -> Result<Quiz, AppError> {
    if req.entity_id <= 0 {
        return Err(AppError::InvalidInput(
            "entityId must be a positive integer".to_string(),
        ));
    }

    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        INSERT INTO quizzes (title, entity_type, entity_id, time_limit_sec, is_active)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, title, entity_type, entity_id, time_limit_sec,
                  is_active, display_order, created_at, updated_at
        "#,
    )
    .bind(req.title.as_deref().map(clean_html))
    .bind(req.entity_type.map(|t| t.as_str()))
    .bind(req.entity_id)
    .bind(req.time_limit_sec)
    .bind(req.is_active.unwrap_or(true))
    .fetch_one(pool)
    .await?;

    tracing::info!(quiz_id = quiz.id, entity_id = quiz.entity_id, "Quiz created");
    Ok(quiz)
}

/// Author view: the quiz with every question, option and correct pointer.
pub async fn get_quiz_detail(pool: &PgPool, quiz_id: i64) -> Result<QuizDetail, AppError> {
    let mut tx = pool.begin().await?;

    let quiz = store::fetch_quiz(&mut *tx, quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;
    let questions = store::fetch_questions_with_options(&mut *tx, quiz_id).await?;

    tx.commit().await?;

    Ok(QuizDetail {
        quiz,
        questions: questions.into_iter().map(AuthorQuestion::from).collect(),
    })
}

pub async fn list_questions(pool: &PgPool, quiz_id: i64) -> Result<Vec<AuthorQuestion>, AppError> {
    Ok(get_quiz_detail(pool, quiz_id).await?.questions)
}

/// Partially updates a quiz and returns the stored row.
pub async fn update_quiz(
    pool: &PgPool,
    quiz_id: i64,
    req: UpdateQuizRequest,
) -> Result<Quiz, AppError> {
    if req.is_empty() {
        return store::fetch_quiz(pool, quiz_id)
            .await?
            .ok_or(AppError::NotFound("Quiz not found".to_string()));
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE quizzes SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = req.title {
        separated.push("title = ");
        separated.push_bind_unseparated(clean_html(&title));
    }

    if let Some(entity_type) = req.entity_type {
        separated.push("entity_type = ");
        separated.push_bind_unseparated(entity_type.as_str());
    }

    if let Some(entity_id) = req.entity_id {
        if entity_id <= 0 {
            return Err(AppError::InvalidInput(
                "entityId must be a positive integer".to_string(),
            ));
        }
        separated.push("entity_id = ");
        separated.push_bind_unseparated(entity_id);
    }

    if let Some(time_limit_sec) = req.time_limit_sec {
        separated.push("time_limit_sec = ");
        separated.push_bind_unseparated(time_limit_sec);
    }

    if let Some(is_active) = req.is_active {
        separated.push("is_active = ");
        separated.push_bind_unseparated(is_active);
    }

    separated.push("updated_at = NOW()");

    builder.push(" WHERE id = ");
    builder.push_bind(quiz_id);
    builder.push(QUIZ_RETURNING);

    let quiz = builder
        .build_query_as::<Quiz>()
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    tracing::info!(quiz_id, "Quiz updated");
    Ok(quiz)
}

/// Deletes a quiz. Questions, options, attempts and answers go with it.
pub async fn delete_quiz(pool: &PgPool, quiz_id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
        .bind(quiz_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    tracing::info!(quiz_id, "Quiz deleted");
    Ok(())
}

pub async fn publish_quiz(
    pool: &PgPool,
    quiz_id: i64,
    is_active: bool,
) -> Result<PublishQuizResponse, AppError> {
    let result = sqlx::query("UPDATE quizzes SET is_active = $1, updated_at = NOW() WHERE id = $2")
        .bind(is_active)
        .bind(quiz_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    tracing::info!(quiz_id, is_active, "Quiz publish state changed");
    Ok(PublishQuizResponse {
        id: quiz_id,
        is_active,
    })
}

/// Adds a question, its options and its correct-option pointer in one transaction.
///
/// The index is checked before anything is written; options keep input order.
pub async fn add_question(
    pool: &PgPool,
    quiz_id: i64,
    req: AddQuestionRequest,
) -> Result<QuestionCreated, AppError> {
    if req.options.len() < 2 {
        return Err(AppError::InvalidInput(
            "A question needs at least two options".to_string(),
        ));
    }
    if req.correct_option_index >= req.options.len() {
        return Err(AppError::InvalidInput(
            "Invalid correct_option_index".to_string(),
        ));
    }
    let points = req.points.unwrap_or(Decimal::ONE);
    ensure_valid_points(points)?;

    let mut tx = pool.begin().await?;

    // Lock the quiz so concurrent additions get distinct display orders.
    sqlx::query_scalar::<_, i64>("SELECT id FROM quizzes WHERE id = $1 FOR UPDATE")
        .bind(quiz_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let question_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO questions (quiz_id, text, points, display_order)
        VALUES (
            $1, $2, $3,
            (SELECT COALESCE(MAX(display_order) + 1, 0) FROM questions WHERE quiz_id = $1)
        )
        RETURNING id
        "#,
    )
    .bind(quiz_id)
    .bind(clean_html(&req.text))
    .bind(points)
    .fetch_one(&mut *tx)
    .await?;

    let mut option_ids = Vec::with_capacity(req.options.len());
    for (index, option) in req.options.iter().enumerate() {
        let option_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO options (question_id, text, display_order)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(question_id)
        .bind(clean_html(&option.text))
        .bind(index as i32)
        .fetch_one(&mut *tx)
        .await?;
        option_ids.push(option_id);
    }

    let correct_option_id = option_ids[req.correct_option_index];
    sqlx::query("UPDATE questions SET correct_option_id = $1 WHERE id = $2")
        .bind(correct_option_id)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(quiz_id, question_id, options = option_ids.len(), "Question added");
    Ok(QuestionCreated {
        question_id,
        option_ids,
        correct_option_id,
    })
}

pub async fn update_question(
    pool: &PgPool,
    question_id: i64,
    req: UpdateQuestionRequest,
) -> Result<QuestionSummary, AppError> {
    if let Some(points) = req.points {
        ensure_valid_points(points)?;
    }

    let question = sqlx::query_as::<_, QuestionSummary>(
        r#"
        UPDATE questions
        SET text = COALESCE($1, text),
            points = COALESCE($2, points),
            updated_at = NOW()
        WHERE id = $3
        RETURNING id, quiz_id, text, points
        "#,
    )
    .bind(req.text.as_deref().map(clean_html))
    .bind(req.points)
    .bind(question_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    tracing::info!(question_id, "Question updated");
    Ok(question)
}

/// Appends an option after the question's existing ones.
pub async fn add_option(pool: &PgPool, question_id: i64, text: &str) -> Result<QuizOption, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query_scalar::<_, i64>("SELECT id FROM questions WHERE id = $1 FOR UPDATE")
        .bind(question_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let option = sqlx::query_as::<_, QuizOption>(
        r#"
        INSERT INTO options (question_id, text, display_order)
        VALUES (
            $1, $2,
            (SELECT COALESCE(MAX(display_order) + 1, 0) FROM options WHERE question_id = $1)
        )
        RETURNING id, question_id, text, display_order
        "#,
    )
    .bind(question_id)
    .bind(clean_html(text))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(question_id, option_id = option.id, "Option added");
    Ok(option)
}

pub async fn update_option(pool: &PgPool, option_id: i64, text: &str) -> Result<QuizOption, AppError> {
    let option = sqlx::query_as::<_, QuizOption>(
        r#"
        UPDATE options
        SET text = $1, updated_at = NOW()
        WHERE id = $2
        RETURNING id, question_id, text, display_order
        "#,
    )
    .bind(clean_html(text))
    .bind(option_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Option not found".to_string()))?;

    Ok(option)
}

/// Deletes an option unless some question designates it as correct.
///
/// The check and the delete share a transaction; the option row lock keeps a
/// concurrent `set_correct_option` from slipping in between.
pub async fn delete_option(pool: &PgPool, option_id: i64) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query_scalar::<_, i64>("SELECT id FROM options WHERE id = $1 FOR UPDATE")
        .bind(option_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Option not found".to_string()))?;

    let designated = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM questions WHERE correct_option_id = $1)",
    )
    .bind(option_id)
    .fetch_one(&mut *tx)
    .await?;

    if designated {
        tracing::warn!(option_id, "Refused to delete the designated correct option");
        return Err(AppError::Conflict(
            "Cannot delete option that is currently set as correct answer".to_string(),
        ));
    }

    sqlx::query("DELETE FROM options WHERE id = $1")
        .bind(option_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(option_id, "Option deleted");
    Ok(())
}

/// Points a question at one of its own options, or clears the pointer when `None`.
pub async fn set_correct_option(
    pool: &PgPool,
    question_id: i64,
    correct_option_id: Option<i64>,
) -> Result<CorrectOptionResponse, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query_scalar::<_, i64>("SELECT id FROM questions WHERE id = $1 FOR UPDATE")
        .bind(question_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    if let Some(option_id) = correct_option_id {
        let owner = sqlx::query_scalar::<_, i64>(
            "SELECT question_id FROM options WHERE id = $1 FOR SHARE",
        )
        .bind(option_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Option not found".to_string()))?;

        if owner != question_id {
            return Err(AppError::Conflict(
                "Option does not belong to this question".to_string(),
            ));
        }
    }

    sqlx::query("UPDATE questions SET correct_option_id = $1, updated_at = NOW() WHERE id = $2")
        .bind(correct_option_id)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(question_id, ?correct_option_id, "Correct option set");
    Ok(CorrectOptionResponse {
        question_id,
        correct_option_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_must_fit_the_column() {
        assert!(ensure_valid_points(Decimal::ONE).is_ok());
        assert!(ensure_valid_points(Decimal::new(25, 1)).is_ok());
        assert!(ensure_valid_points(Decimal::new(150, 2)).is_ok());
        assert!(ensure_valid_points(Decimal::new(1000, 3)).is_ok());
        assert!(ensure_valid_points(Decimal::new(999_999, 2)).is_ok());

        for bad in [
            Decimal::ZERO,
            Decimal::new(-1, 0),
            Decimal::new(1, 3),
            Decimal::new(10_000, 0),
            Decimal::new(100_000, 0),
        ] {
            assert!(
                matches!(ensure_valid_points(bad), Err(AppError::InvalidInput(_))),
                "{} should be rejected",
                bad
            );
        }
    }
}
