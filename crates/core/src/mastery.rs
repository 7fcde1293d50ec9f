use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Learner;

/// Classification bands for the mastery percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MasteryLevel {
    Beginner,
    Intermediate,
    Advanced,
    Master,
}

impl MasteryLevel {
    /// Classifies a mastery percentage.
    ///
    /// Beginner covers 0–40, Intermediate 41–70, Advanced 71–89 and
    /// Master everything from 90 up.
    #[must_use]
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            0..=40 => MasteryLevel::Beginner,
            41..=70 => MasteryLevel::Intermediate,
            71..=89 => MasteryLevel::Advanced,
            _ => MasteryLevel::Master,
        }
    }
}

impl fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MasteryLevel::Beginner => "Beginner",
            MasteryLevel::Intermediate => "Intermediate",
            MasteryLevel::Advanced => "Advanced",
            MasteryLevel::Master => "Master",
        };
        f.write_str(name)
    }
}

/// Aggregate accuracy percentage across the full quiz attempt history.
///
/// Counts every answer in every attempt; repeated attempts at the same
/// question all contribute. Returns 0 when no answers exist anywhere.
/// The result only depends on the multiset of answers, not their order.
#[must_use]
pub fn calculate_mastery(learner: &Learner) -> u8 {
    let mut correct: u64 = 0;
    let mut total: u64 = 0;
    for attempt in learner.quiz_attempts() {
        for answer in attempt.answers() {
            total += 1;
            if answer.is_correct {
                correct += 1;
            }
        }
    }

    if total == 0 {
        return 0;
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percentage = ((correct as f64 / total as f64) * 100.0).round() as u8;
    percentage.min(100)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
