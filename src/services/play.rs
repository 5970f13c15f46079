// src/services/play.rs

//! Learner-facing rendering of a quiz. Correct-option pointers never leave this module.

use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        question::QuestionWithOptions,
        quiz::{EntityType, PlayOption, PlayQuestion, PlayQuiz, Quiz},
    },
    services::store,
};

/// Play view of a quiz addressed by id. Inactive quizzes are hidden even when addressed directly.
pub async fn quiz_for_play(pool: &PgPool, quiz_id: i64) -> Result<PlayQuiz, AppError> {
    let mut tx = pool.begin().await?;
    let quiz = store::fetch_quiz(&mut *tx, quiz_id).await?;
    let play = load_projection(&mut tx, quiz).await?;
    tx.commit().await?;
    Ok(play)
}

/// Play view of the quiz attached to a content node.
pub async fn quiz_for_play_by_entity(
    pool: &PgPool,
    entity_id: i64,
    entity_type: Option<EntityType>,
) -> Result<PlayQuiz, AppError> {
    let mut tx = pool.begin().await?;
    let quiz =
        store::fetch_quiz_by_entity(&mut *tx, entity_id, entity_type.map(|t| t.as_str())).await?;
    let play = load_projection(&mut tx, quiz).await?;
    tx.commit().await?;
    Ok(play)
}

async fn load_projection(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    quiz: Option<Quiz>,
) -> Result<PlayQuiz, AppError> {
    let quiz = quiz.ok_or(AppError::NotFound("Quiz not found".to_string()))?;
    if !quiz.is_active {
        return Err(AppError::InvalidState("Quiz is not active".to_string()));
    }

    let questions = store::fetch_questions_with_options(&mut **tx, quiz.id).await?;
    Ok(project(quiz, questions))
}

/// Strips correctness data from a loaded quiz.
pub fn project(quiz: Quiz, questions: Vec<QuestionWithOptions>) -> PlayQuiz {
    PlayQuiz {
        id: quiz.id,
        title: quiz.title,
        entity_type: quiz.entity_type,
        entity_id: quiz.entity_id,
        time_limit_sec: quiz.time_limit_sec,
        questions: questions
            .into_iter()
            .map(|q| PlayQuestion {
                id: q.question.id,
                text: q.question.text,
                points: q.question.points,
                options: q
                    .options
                    .into_iter()
                    .map(|o| PlayOption { id: o.id, text: o.text })
                    .collect(),
            })
            .collect(),
    }
}
