// src/models/stats.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// Aggregates over one quiz's attempts.
/// Score and duration figures only consider sealed attempts; they are `None` when there are none.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuizStats {
    pub total_attempts: i64,
    pub submitted_attempts: i64,
    pub average_score: Option<Decimal>,
    pub highest_score: Option<Decimal>,
    pub lowest_score: Option<Decimal>,
    pub average_duration: Option<Decimal>,
}
