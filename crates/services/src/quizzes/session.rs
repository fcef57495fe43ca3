use std::sync::atomic::{AtomicU64, Ordering};

use aarambh_core::model::{AnswerOption, QuizQuestion, QuizSet, ScorePercent};

use crate::error::QuizSessionError;
use super::workflow::AttemptPersistence;

/// Final tally of a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub correct: u32,
    pub total: u32,
    pub score: ScorePercent,
}

/// What `advance` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the question at this index.
    Next(usize),
    /// That was the last question.
    Finished(QuizResult),
}

/// Read-only progress numbers for rendering a quiz header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub position: usize,
    pub total: usize,
    pub correct: u32,
    pub is_finished: bool,
}

static NEXT_RUN: AtomicU64 = AtomicU64::new(1);

fn next_run() -> u64 {
    NEXT_RUN.fetch_add(1, Ordering::Relaxed)
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Walks a user through one quiz set, question by question.
///
/// The session is purely in memory. Persisting the final score is the job of
/// [`super::QuizWorkflow`], which records the outcome back onto the session.
/// Clones share the run id, so a run is saved at most once however many
/// copies of it finish.
#[derive(Debug, Clone)]
pub struct QuizSession {
    run: u64,
    set: QuizSet,
    index: usize,
    selected: Option<AnswerOption>,
    correct: u32,
    result: Option<QuizResult>,
    persistence: Option<AttemptPersistence>,
}

impl QuizSession {
    /// # Errors
    ///
    /// Returns `QuizSessionError::Empty` if the set has no questions.
    pub fn start(set: QuizSet) -> Result<Self, QuizSessionError> {
        if set.is_empty() {
            return Err(QuizSessionError::Empty);
        }
        Ok(Self {
            run: next_run(),
            set,
            index: 0,
            selected: None,
            correct: 0,
            result: None,
            persistence: None,
        })
    }

    /// Identifies one pass through the set; `retake` starts a new run.
    #[must_use]
    pub fn run_id(&self) -> u64 {
        self.run
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        self.set.subject()
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        self.set.questions()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.set.len()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn selected(&self) -> Option<AnswerOption> {
        self.selected
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn result(&self) -> Option<QuizResult> {
        self.result
    }

    /// Outcome of the last attempt write, if the workflow has tried one.
    #[must_use]
    pub fn persistence(&self) -> Option<&AttemptPersistence> {
        self.persistence.as_ref()
    }

    pub(crate) fn set_persistence(&mut self, outcome: AttemptPersistence) {
        self.persistence = Some(outcome);
    }

    /// The question being answered, or `None` once finished.
    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.is_finished() {
            None
        } else {
            self.set.get(self.index)
        }
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            position: if self.is_finished() {
                self.total()
            } else {
                self.index + 1
            },
            total: self.total(),
            correct: self.correct,
            is_finished: self.is_finished(),
        }
    }

    /// Record (or replace) the pending answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Completed` once the quiz is finished.
    pub fn select_answer(&mut self, answer: AnswerOption) -> Result<(), QuizSessionError> {
        if self.is_finished() {
            return Err(QuizSessionError::Completed);
        }
        self.selected = Some(answer);
        Ok(())
    }

    /// Score the pending answer and move on, finishing after the last question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::NoAnswerSelected` without a pending answer
    /// and `QuizSessionError::Completed` once the quiz is finished.
    pub fn advance(&mut self) -> Result<Advance, QuizSessionError> {
        if self.is_finished() {
            return Err(QuizSessionError::Completed);
        }
        let answer = self.selected.ok_or(QuizSessionError::NoAnswerSelected)?;
        let question = self.set.get(self.index).ok_or(QuizSessionError::Completed)?;

        if question.is_correct(answer) {
            self.correct += 1;
        }

        if self.index + 1 < self.total() {
            self.index += 1;
            self.selected = None;
            return Ok(Advance::Next(self.index));
        }

        let total = u32::try_from(self.total()).unwrap_or(u32::MAX);
        let result = QuizResult {
            correct: self.correct,
            total,
            score: ScorePercent::from_counts(self.correct, total)?,
        };
        self.result = Some(result);
        Ok(Advance::Finished(result))
    }

    /// Start over on the same questions.
    pub fn retake(&mut self) {
        self.run = next_run();
        self.index = 0;
        self.selected = None;
        self.correct = 0;
        self.result = None;
        self.persistence = None;
    }
}
