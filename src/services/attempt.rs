// src/services/attempt.rs

//! Attempt lifecycle: start, submit (validate, grade, persist, seal) and review.

use chrono::Utc;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::attempt::{
        AnswerInput, AnswerReview, AttemptDetail, AttemptStarted, AttemptStatus, QuizAttempt,
        SubmissionResult,
    },
    services::{grading, store},
};

/// Opens an attempt on an active quiz. Nothing about the quiz is copied into the attempt;
/// grading reads the quiz as it stands at submission time.
pub async fn start_attempt(
    pool: &PgPool,
    quiz_id: i64,
    student_id: i64,
) -> Result<AttemptStarted, AppError> {
    let quiz = store::fetch_quiz(pool, quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    if !quiz.is_active {
        return Err(AppError::InvalidState("Quiz is not active".to_string()));
    }

    let attempt = sqlx::query_as::<_, QuizAttempt>(
        r#"
        INSERT INTO quiz_attempts (quiz_id, student_id, started_at)
        VALUES ($1, $2, $3)
        RETURNING id, quiz_id, student_id, score, started_at, submitted_at, duration_sec, created_at
        "#,
    )
    .bind(quiz_id)
    .bind(student_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::info!(attempt_id = attempt.id, quiz_id, student_id, "Attempt started");
    Ok(AttemptStarted {
        attempt_id: attempt.id,
        quiz_id: attempt.quiz_id,
        student_id: attempt.student_id,
        started_at: attempt.started_at,
    })
}

/// Submits and seals an attempt in a single transaction.
///
/// * The attempt is looked up by id AND student, so a foreign attempt reads as missing.
/// * The attempt row is locked; a racing submission waits and then sees it sealed.
/// * The sealing write only applies while `submitted_at` is still null.
/// * Any error drops the transaction, so no answer of a rejected batch is kept.
pub async fn submit_attempt(
    pool: &PgPool,
    attempt_id: i64,
    student_id: i64,
    answers: &[AnswerInput],
) -> Result<SubmissionResult, AppError> {
    let mut tx = pool.begin().await?;

    let attempt = sqlx::query_as::<_, QuizAttempt>(
        r#"
        SELECT id, quiz_id, student_id, score, started_at, submitted_at, duration_sec, created_at
        FROM quiz_attempts
        WHERE id = $1 AND student_id = $2
        FOR UPDATE
        "#,
    )
    .bind(attempt_id)
    .bind(student_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    let quiz = store::fetch_quiz(&mut *tx, attempt.quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;
    let questions = store::fetch_questions_with_options(&mut *tx, quiz.id).await?;

    if !quiz.is_active {
        return Err(AppError::InvalidState(
            "Cannot submit to inactive quiz".to_string(),
        ));
    }

    if attempt.status() == AttemptStatus::Submitted {
        tracing::warn!(attempt_id, "Rejected resubmission of a sealed attempt");
        return Err(AppError::InvalidState("Attempt already submitted".to_string()));
    }

    let graded = grading::grade_submission(&questions, answers).inspect_err(|e| {
        tracing::warn!(attempt_id, error = %e, "Submission rejected");
    })?;

    for answer in &graded.answers {
        sqlx::query(
            r#"
            INSERT INTO attempt_answers
                (attempt_id, question_id, selected_option_id, is_correct, points_awarded)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (attempt_id, question_id) DO UPDATE SET
                selected_option_id = EXCLUDED.selected_option_id,
                is_correct = EXCLUDED.is_correct,
                points_awarded = EXCLUDED.points_awarded,
                updated_at = NOW()
            "#,
        )
        .bind(attempt_id)
        .bind(answer.question_id)
        .bind(answer.selected_option_id)
        .bind(answer.is_correct)
        .bind(answer.points_awarded)
        .execute(&mut *tx)
        .await?;
    }

    let submitted_at = Utc::now();
    let elapsed = (submitted_at - attempt.started_at).num_seconds().max(0);
    let duration_sec = i32::try_from(elapsed).unwrap_or(i32::MAX);

    let sealed = sqlx::query(
        r#"
        UPDATE quiz_attempts
        SET score = $1, submitted_at = $2, duration_sec = $3
        WHERE id = $4 AND submitted_at IS NULL
        "#,
    )
    .bind(graded.total_score)
    .bind(submitted_at)
    .bind(duration_sec)
    .bind(attempt_id)
    .execute(&mut *tx)
    .await?;

    if sealed.rows_affected() == 0 {
        return Err(AppError::InvalidState("Attempt already submitted".to_string()));
    }

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to commit submission of attempt {}: {:?}", attempt_id, e);
        AppError::Internal(e.to_string())
    })?;

    tracing::info!(
        attempt_id,
        student_id,
        score = %graded.total_score,
        duration_sec,
        "Attempt submitted"
    );

    Ok(SubmissionResult {
        attempt_id,
        quiz_id: attempt.quiz_id,
        student_id,
        score: graded.total_score,
        submitted_at,
        duration_sec,
        answers: graded.answers,
    })
}

/// Reads an attempt with its answers.
///
/// `owner` restricts the lookup to one student's attempts; authors pass `None`.
pub async fn get_attempt(
    pool: &PgPool,
    attempt_id: i64,
    owner: Option<i64>,
) -> Result<AttemptDetail, AppError> {
    let attempt = sqlx::query_as::<_, QuizAttempt>(
        r#"
        SELECT id, quiz_id, student_id, score, started_at, submitted_at, duration_sec, created_at
        FROM quiz_attempts
        WHERE id = $1 AND ($2::BIGINT IS NULL OR student_id = $2)
        "#,
    )
    .bind(attempt_id)
    .bind(owner)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    let quiz_title = sqlx::query_scalar::<_, Option<String>>("SELECT title FROM quizzes WHERE id = $1")
        .bind(attempt.quiz_id)
        .fetch_optional(pool)
        .await?
        .flatten();

    let answers = sqlx::query_as::<_, AnswerReview>(
        r#"
        SELECT
            aa.question_id,
            qu.text AS question_text,
            qu.points AS question_points,
            aa.selected_option_id,
            o.text AS selected_option_text,
            aa.is_correct,
            aa.points_awarded
        FROM attempt_answers aa
        JOIN questions qu ON qu.id = aa.question_id
        LEFT JOIN options o ON o.id = aa.selected_option_id
        WHERE aa.attempt_id = $1
        ORDER BY qu.display_order ASC, qu.id ASC
        "#,
    )
    .bind(attempt_id)
    .fetch_all(pool)
    .await?;

    Ok(AttemptDetail {
        status: attempt.status(),
        attempt,
        quiz_title,
        answers,
    })
}
