use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use aarambh_core::model::{AttemptRecording, QuizAttempt, QuizSet, UserSession};
use rand::seq::SliceRandom;
use storage::repository::{AttemptRepository, QuizRepository};

use crate::Clock;
use crate::error::{QuizServiceError, QuizSessionError};
use super::session::{Advance, QuizResult, QuizSession};

/// Whether the attempt rows for a finished quiz reached storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptPersistence {
    Saved { rows: usize },
    /// Another copy of the same run is writing right now.
    InProgress,
    Failed { reason: String },
}

impl AttemptPersistence {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Result of advancing through the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizStep {
    Next(usize),
    Finished {
        result: QuizResult,
        persistence: AttemptPersistence,
    },
}

/// Loads quiz sets and persists attempts when a quiz finishes.
#[derive(Clone)]
pub struct QuizWorkflow {
    clock: Clock,
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn AttemptRepository>,
    recording: AttemptRecording,
    shuffle: bool,
    /// Run id to `None` while writing, `Some(rows)` once stored.
    claims: Arc<Mutex<HashMap<u64, Option<usize>>>>,
}

impl QuizWorkflow {
    #[must_use]
    pub fn new(
        clock: Clock,
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            quizzes,
            attempts,
            recording: AttemptRecording::default(),
            shuffle: false,
            claims: Arc::default(),
        }
    }

    #[must_use]
    pub fn with_recording(mut self, recording: AttemptRecording) -> Self {
        self.recording = recording;
        self
    }

    /// Shuffle question order inside each set when a quiz starts.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn recording(&self) -> AttemptRecording {
        self.recording
    }

    /// Approved questions grouped into one set per subject.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if questions cannot be loaded.
    pub async fn list_sets(&self) -> Result<Vec<QuizSet>, QuizServiceError> {
        let questions = self.quizzes.list_quizzes(true).await?;
        Ok(QuizSet::group_by_subject(questions))
    }

    /// Start a session over the approved questions of `subject`.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Empty` (wrapped) when the subject has no
    /// approved questions, or a storage error.
    pub async fn start_quiz(&self, subject: &str) -> Result<QuizSession, QuizServiceError> {
        let mut questions: Vec<_> = self
            .quizzes
            .list_quizzes(true)
            .await?
            .into_iter()
            .filter(|q| q.subject() == subject)
            .collect();
        if questions.is_empty() {
            return Err(QuizSessionError::Empty.into());
        }
        if self.shuffle {
            questions.shuffle(&mut rand::rng());
        }

        let session = QuizSession::start(QuizSet::new(subject, questions)?)?;
        tracing::info!(subject, questions = session.total(), "quiz started");
        Ok(session)
    }

    /// Advance the session and, on the last question, write the attempt rows.
    ///
    /// A failed write never hides the result: it comes back as
    /// `AttemptPersistence::Failed` and is kept on the session for
    /// [`QuizWorkflow::retry_persistence`].
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` for state machine violations.
    pub async fn advance(
        &self,
        session: &mut QuizSession,
        user: &UserSession,
    ) -> Result<QuizStep, QuizServiceError> {
        match session.advance()? {
            Advance::Next(index) => Ok(QuizStep::Next(index)),
            Advance::Finished(result) => {
                tracing::info!(
                    subject = session.subject(),
                    correct = result.correct,
                    total = result.total,
                    score = %result.score,
                    "quiz finished"
                );
                let persistence = self.persist(session, user, result).await;
                Ok(QuizStep::Finished {
                    result,
                    persistence,
                })
            }
        }
    }

    /// Try again to store the attempt rows of a finished quiz.
    ///
    /// Returns the stored outcome unchanged when the rows were already saved.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Completed` (wrapped) when the quiz has not
    /// finished yet.
    pub async fn retry_persistence(
        &self,
        session: &mut QuizSession,
        user: &UserSession,
    ) -> Result<AttemptPersistence, QuizServiceError> {
        let result = session.result().ok_or(QuizSessionError::Completed)?;
        if let Some(saved) = session.persistence().filter(|p| p.is_saved()) {
            return Ok(saved.clone());
        }
        Ok(self.persist(session, user, result).await)
    }

    async fn persist(
        &self,
        session: &mut QuizSession,
        user: &UserSession,
        result: QuizResult,
    ) -> AttemptPersistence {
        let run = session.run_id();
        if let Some(taken) = self.claim(run) {
            tracing::debug!(run, "attempt already claimed");
            session.set_persistence(taken.clone());
            return taken;
        }

        let rows = self.attempt_rows(session, user, result);
        let outcome = match self.attempts.append_attempts(&rows).await {
            Ok(rows) => {
                self.settle(run, Some(rows));
                AttemptPersistence::Saved { rows }
            }
            Err(err) => {
                self.settle(run, None);
                tracing::warn!(
                    subject = session.subject(),
                    user = %user.user_id(),
                    error = %err,
                    "failed to save quiz attempt"
                );
                AttemptPersistence::Failed {
                    reason: err.to_string(),
                }
            }
        };
        session.set_persistence(outcome.clone());
        outcome
    }

    /// Reserve `run` for writing. Returns the existing outcome when another
    /// copy of the run got there first.
    fn claim(&self, run: u64) -> Option<AttemptPersistence> {
        let mut claims = self.claims.lock().unwrap_or_else(PoisonError::into_inner);
        match claims.get(&run) {
            Some(Some(rows)) => Some(AttemptPersistence::Saved { rows: *rows }),
            Some(None) => Some(AttemptPersistence::InProgress),
            None => {
                claims.insert(run, None);
                None
            }
        }
    }

    /// Record a stored run, or release the claim after a failed write.
    fn settle(&self, run: u64, rows: Option<usize>) {
        let mut claims = self.claims.lock().unwrap_or_else(PoisonError::into_inner);
        match rows {
            Some(rows) => {
                claims.insert(run, Some(rows));
            }
            None => {
                claims.remove(&run);
            }
        }
    }

    fn attempt_rows(
        &self,
        session: &QuizSession,
        user: &UserSession,
        result: QuizResult,
    ) -> Vec<QuizAttempt> {
        let now = self.clock.now();
        let row = |q: &aarambh_core::model::QuizQuestion| {
            QuizAttempt::new(user.user_id(), q.id(), result.score, now)
        };
        match self.recording {
            AttemptRecording::PerQuestion => session.questions().iter().map(row).collect(),
            AttemptRecording::PerSession => session.questions().first().map(row).into_iter().collect(),
        }
    }
}
