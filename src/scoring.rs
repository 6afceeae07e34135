//! Final score calculation.
//!
//! Two formulas are in use for the same quiz: a flat reward per correct
//! answer, and the same reward scaled by the seconds left on the clock. The
//! formula is chosen once through configuration; the flat reward is the
//! default.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ScoringStrategy {
    /// correct answers x points per correct answer
    #[default]
    PerCorrectAnswer,
    /// correct answers x points per correct answer x seconds remaining
    TimeWeighted,
}

impl ScoringStrategy {
    /// Never negative: time left below zero counts as zero.
    pub fn score(&self, correct_answers: u32, points_per_correct: u32, time_remaining: i64) -> u64 {
        let base = u64::from(correct_answers) * u64::from(points_per_correct);
        match self {
            ScoringStrategy::PerCorrectAnswer => base,
            ScoringStrategy::TimeWeighted => base.saturating_mul(time_remaining.max(0) as u64),
        }
    }
}
