// src/services/grading.rs

//! Pure grading of a submission against a quiz's answer key.
//! Nothing here touches the database; the caller loads the key and persists the result.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{
    error::AppError,
    models::{
        attempt::{AnswerInput, GradedAnswer},
        question::QuestionWithOptions,
    },
};

#[derive(Debug)]
pub struct GradedSubmission {
    /// One entry per distinct question, in order of first appearance.
    pub answers: Vec<GradedAnswer>,
    pub total_score: Decimal,
}

/// Validates the whole batch, then grades it.
///
/// * Any question outside the quiz rejects the batch (`Conflict`).
/// * Any selected option outside its question rejects the batch (`Conflict`).
/// * A question listed twice keeps the later selection and is scored once.
/// * An unanswered question, or one without a correct option, earns nothing.
pub fn grade_submission(
    questions: &[QuestionWithOptions],
    answers: &[AnswerInput],
) -> Result<GradedSubmission, AppError> {
    let key: HashMap<i64, &QuestionWithOptions> =
        questions.iter().map(|q| (q.question.id, q)).collect();

    // Whole-batch checks run before anything is graded.
    for answer in answers {
        if !key.contains_key(&answer.question_id) {
            return Err(AppError::Conflict(format!(
                "Question {} does not belong to this quiz",
                answer.question_id
            )));
        }
    }

    for answer in answers {
        let (Some(selected), Some(question)) = (answer.selected_option_id, key.get(&answer.question_id))
        else {
            continue;
        };
        if !question.options.iter().any(|o| o.id == selected) {
            return Err(AppError::Conflict(format!(
                "Option {} does not belong to question {}",
                selected, answer.question_id
            )));
        }
    }

    let mut position: HashMap<i64, usize> = HashMap::new();
    let mut collapsed: Vec<&AnswerInput> = Vec::with_capacity(answers.len());
    for answer in answers {
        match position.get(&answer.question_id) {
            Some(&idx) => collapsed[idx] = answer,
            None => {
                position.insert(answer.question_id, collapsed.len());
                collapsed.push(answer);
            }
        }
    }

    let mut total_score = Decimal::ZERO;
    let mut graded = Vec::with_capacity(collapsed.len());

    for answer in collapsed {
        let Some(question) = key.get(&answer.question_id) else {
            continue;
        };

        let is_correct = matches!(
            (answer.selected_option_id, question.question.correct_option_id),
            (Some(selected), Some(correct)) if selected == correct
        );
        let points_awarded = if is_correct {
            question.question.points
        } else {
            Decimal::ZERO
        };
        total_score += points_awarded;

        graded.push(GradedAnswer {
            question_id: answer.question_id,
            selected_option_id: answer.selected_option_id,
            is_correct,
            points_awarded,
        });
    }

    Ok(GradedSubmission {
        answers: graded,
        total_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Question, QuizOption};

    /// "2+2=?" worth 2 points, options 3/4/5 with "4" correct.
    fn arithmetic_question() -> QuestionWithOptions {
        let options = [(101, "3"), (102, "4"), (103, "5")]
            .into_iter()
            .enumerate()
            .map(|(i, (id, text))| QuizOption {
                id,
                question_id: 10,
                text: text.to_string(),
                display_order: i as i32,
            })
            .collect();

        QuestionWithOptions {
            question: Question {
                id: 10,
                quiz_id: 1,
                text: "2+2=?".to_string(),
                points: Decimal::new(2, 0),
                display_order: 0,
                correct_option_id: Some(102),
            },
            options,
        }
    }

    fn capital_question() -> QuestionWithOptions {
        QuestionWithOptions {
            question: Question {
                id: 20,
                quiz_id: 1,
                text: "Capital of France?".to_string(),
                points: Decimal::ONE,
                display_order: 1,
                correct_option_id: Some(201),
            },
            options: vec![
                QuizOption { id: 201, question_id: 20, text: "Paris".into(), display_order: 0 },
                QuizOption { id: 202, question_id: 20, text: "Lyon".into(), display_order: 1 },
            ],
        }
    }

    fn answer(question_id: i64, selected: Option<i64>) -> AnswerInput {
        AnswerInput {
            question_id,
            selected_option_id: selected,
        }
    }

    #[test]
    fn correct_option_awards_question_points() {
        let graded = grade_submission(&[arithmetic_question()], &[answer(10, Some(102))]).unwrap();

        assert_eq!(graded.total_score, Decimal::new(2, 0));
        assert_eq!(
            graded.answers,
            vec![GradedAnswer {
                question_id: 10,
                selected_option_id: Some(102),
                is_correct: true,
                points_awarded: Decimal::new(2, 0),
            }]
        );
    }

    #[test]
    fn omitted_selection_scores_zero() {
        let graded = grade_submission(&[arithmetic_question()], &[answer(10, None)]).unwrap();

        assert_eq!(graded.total_score, Decimal::ZERO);
        assert!(!graded.answers[0].is_correct);
        assert_eq!(graded.answers[0].points_awarded, Decimal::ZERO);
    }

    #[test]
    fn missing_correct_option_never_matches_missing_selection() {
        let mut question = arithmetic_question();
        question.question.correct_option_id = None;

        let graded = grade_submission(&[question], &[answer(10, None)]).unwrap();
        assert!(!graded.answers[0].is_correct);
        assert_eq!(graded.total_score, Decimal::ZERO);
    }

    #[test]
    fn foreign_question_rejects_whole_batch() {
        let questions = [arithmetic_question(), capital_question()];
        let err = grade_submission(&questions, &[answer(10, Some(102)), answer(99, None)]).unwrap_err();

        match err {
            AppError::Conflict(msg) => assert!(msg.contains("does not belong to this quiz")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn option_from_another_question_is_a_conflict() {
        let questions = [arithmetic_question(), capital_question()];
        // 201 is a real option, but it belongs to question 20.
        let err = grade_submission(&questions, &[answer(20, Some(201)), answer(10, Some(201))]).unwrap_err();

        match err {
            AppError::Conflict(msg) => assert!(msg.contains("does not belong to question 10")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn duplicate_question_keeps_later_selection() {
        let graded = grade_submission(
            &[arithmetic_question()],
            &[answer(10, Some(102)), answer(10, Some(103))],
        )
        .unwrap();

        assert_eq!(graded.answers.len(), 1);
        assert_eq!(graded.answers[0].selected_option_id, Some(103));
        assert!(!graded.answers[0].is_correct);
        assert_eq!(graded.total_score, Decimal::ZERO);
    }

    #[test]
    fn scores_accumulate_across_questions() {
        let questions = [arithmetic_question(), capital_question()];
        let graded = grade_submission(
            &questions,
            &[answer(20, Some(201)), answer(10, Some(102))],
        )
        .unwrap();

        assert_eq!(graded.total_score, Decimal::new(3, 0));
        assert_eq!(graded.answers[0].question_id, 20);
        assert_eq!(graded.answers[1].question_id, 10);
    }
}
