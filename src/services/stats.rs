// src/services/stats.rs

use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        attempt::{QuizAttempt, StudentAttemptEntry},
        stats::QuizStats,
    },
    services::store,
    utils::pagination::{Page, PageMeta, Pagination},
};

/// Score and duration aggregates for one quiz.
pub async fn quiz_stats(pool: &PgPool, quiz_id: i64) -> Result<QuizStats, AppError> {
    store::fetch_quiz(pool, quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let stats = sqlx::query_as::<_, QuizStats>(
        r#"
        SELECT
            COUNT(*) AS total_attempts,
            COUNT(submitted_at) AS submitted_attempts,
            AVG(score) FILTER (WHERE submitted_at IS NOT NULL) AS average_score,
            MAX(score) FILTER (WHERE submitted_at IS NOT NULL) AS highest_score,
            MIN(score) FILTER (WHERE submitted_at IS NOT NULL) AS lowest_score,
            AVG(duration_sec) FILTER (WHERE submitted_at IS NOT NULL) AS average_duration
        FROM quiz_attempts
        WHERE quiz_id = $1
        "#,
    )
    .bind(quiz_id)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to aggregate stats for quiz {}: {:?}", quiz_id, e);
        AppError::Internal(e.to_string())
    })?;

    Ok(stats)
}

/// Teacher view: every attempt on a quiz, newest first.
pub async fn list_quiz_attempts(
    pool: &PgPool,
    quiz_id: i64,
    pagination: Pagination,
) -> Result<Page<QuizAttempt>, AppError> {
    store::fetch_quiz(pool, quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let items = sqlx::query_as::<_, QuizAttempt>(
        r#"
        SELECT id, quiz_id, student_id, score, started_at, submitted_at, duration_sec, created_at
        FROM quiz_attempts
        WHERE quiz_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(quiz_id)
    .bind(pagination.limit as i64)
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quiz_attempts WHERE quiz_id = $1")
        .bind(quiz_id)
        .fetch_one(pool)
        .await?;

    Ok(Page {
        items,
        pagination: PageMeta::new(pagination, total),
    })
}

/// Student view: one student's attempts across quizzes, newest first.
pub async fn list_student_attempts(
    pool: &PgPool,
    student_id: i64,
    pagination: Pagination,
) -> Result<Page<StudentAttemptEntry>, AppError> {
    let items = sqlx::query_as::<_, StudentAttemptEntry>(
        r#"
        SELECT
            a.id,
            a.quiz_id,
            q.title AS quiz_title,
            q.entity_type,
            q.entity_id,
            a.score,
            a.started_at,
            a.submitted_at,
            a.duration_sec
        FROM quiz_attempts a
        JOIN quizzes q ON q.id = a.quiz_id
        WHERE a.student_id = $1
        ORDER BY a.created_at DESC, a.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(student_id)
    .bind(pagination.limit as i64)
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    let total =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quiz_attempts WHERE student_id = $1")
            .bind(student_id)
            .fetch_one(pool)
            .await?;

    Ok(Page {
        items,
        pagination: PageMeta::new(pagination, total),
    })
}
