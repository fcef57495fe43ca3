use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{QuizId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("score must be between 0 and 100 (got {0})")]
    ScoreOutOfRange(i64),

    #[error("correct count ({correct}) exceeds question count ({total})")]
    TooManyCorrect { correct: u32, total: u32 },

    #[error("cannot score an empty quiz")]
    NoQuestions,

    #[error("unknown attempt recording policy: {0}")]
    UnknownRecording(String),
}

//
// ─── SCORE ────────────────────────────────────────────────────────────────────
//

/// Integer percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ScorePercent(u8);

impl ScorePercent {
    pub const ZERO: ScorePercent = ScorePercent(0);
    pub const FULL: ScorePercent = ScorePercent(100);

    /// # Errors
    ///
    /// Returns `AttemptError::ScoreOutOfRange` outside `0..=100`.
    pub fn new(value: i64) -> Result<Self, AttemptError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(AttemptError::ScoreOutOfRange(value))
    }

    /// `round(correct / total * 100)`, with halves rounding up.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::NoQuestions` when `total` is zero and
    /// `AttemptError::TooManyCorrect` when `correct > total`.
    pub fn from_counts(correct: u32, total: u32) -> Result<Self, AttemptError> {
        if total == 0 {
            return Err(AttemptError::NoQuestions);
        }
        if correct > total {
            return Err(AttemptError::TooManyCorrect { correct, total });
        }
        let percent = crate::progress::rounded_percent(u64::from(correct), u64::from(total));
        Ok(Self(u8::try_from(percent).unwrap_or(100)))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for ScorePercent {
    type Error = AttemptError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScorePercent> for i64 {
    fn from(score: ScorePercent) -> Self {
        i64::from(score.0)
    }
}

impl fmt::Display for ScorePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

//
// ─── ATTEMPT ──────────────────────────────────────────────────────────────────
//

/// A persisted record of a finished quiz, scored as a percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub user_id: UserId,
    pub quiz_id: QuizId,
    pub score: ScorePercent,
    pub attempted_at: DateTime<Utc>,
}

impl QuizAttempt {
    #[must_use]
    pub fn new(
        user_id: UserId,
        quiz_id: QuizId,
        score: ScorePercent,
        attempted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            quiz_id,
            score,
            attempted_at,
        }
    }
}

/// How many attempt rows a finished quiz set produces.
///
/// `PerQuestion` writes one row per question, each carrying the set's
/// aggregate percentage; it matches the rows already present in deployed
/// backends. `PerSession` writes a single row keyed by the first question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptRecording {
    #[default]
    PerQuestion,
    PerSession,
}

impl AttemptRecording {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PerQuestion => "per-question",
            Self::PerSession => "per-session",
        }
    }
}

impl FromStr for AttemptRecording {
    type Err = AttemptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "per-question" => Ok(Self::PerQuestion),
            "per-session" => Ok(Self::PerSession),
            other => Err(AttemptError::UnknownRecording(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_rounds_half_up() {
        assert_eq!(ScorePercent::from_counts(1, 2).unwrap().value(), 50);
        assert_eq!(ScorePercent::from_counts(2, 3).unwrap().value(), 67);
        assert_eq!(ScorePercent::from_counts(1, 3).unwrap().value(), 33);
        assert_eq!(ScorePercent::from_counts(1, 8).unwrap().value(), 13);
        assert_eq!(ScorePercent::from_counts(0, 5).unwrap(), ScorePercent::ZERO);
        assert_eq!(ScorePercent::from_counts(5, 5).unwrap(), ScorePercent::FULL);
    }

    #[test]
    fn score_rejects_impossible_counts() {
        assert_eq!(ScorePercent::from_counts(0, 0), Err(AttemptError::NoQuestions));
        assert_eq!(
            ScorePercent::from_counts(3, 2),
            Err(AttemptError::TooManyCorrect {
                correct: 3,
                total: 2
            })
        );
        assert_eq!(ScorePercent::new(101), Err(AttemptError::ScoreOutOfRange(101)));
        assert_eq!(ScorePercent::new(-1), Err(AttemptError::ScoreOutOfRange(-1)));
    }

    #[test]
    fn recording_policy_parses_cli_values() {
        assert_eq!(
            "per-session".parse::<AttemptRecording>().unwrap(),
            AttemptRecording::PerSession
        );
        assert_eq!(
            AttemptRecording::PerQuestion.as_str().parse::<AttemptRecording>().unwrap(),
            AttemptRecording::PerQuestion
        );
        assert!("per-day".parse::<AttemptRecording>().is_err());
    }
}
