use std::collections::HashMap;
use std::sync::Arc;

use aarambh_core::model::{QuizId, UserSession};
use aarambh_core::progress::{ProgressInputs, ProgressSnapshot};
use storage::repository::{
    AttemptRepository, CourseRepository, LessonRepository, QuizRepository, UserStatsRepository,
};

use crate::completion::CompletionService;
use crate::error::ProgressServiceError;

/// Gathers everything the progress dashboard needs and folds it into a snapshot.
#[derive(Clone)]
pub struct ProgressService {
    courses: Arc<dyn CourseRepository>,
    lessons: Arc<dyn LessonRepository>,
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn AttemptRepository>,
    stats: Arc<dyn UserStatsRepository>,
    completion: Arc<CompletionService>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        lessons: Arc<dyn LessonRepository>,
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn AttemptRepository>,
        stats: Arc<dyn UserStatsRepository>,
        completion: Arc<CompletionService>,
    ) -> Self {
        Self {
            courses,
            lessons,
            quizzes,
            attempts,
            stats,
            completion,
        }
    }

    /// Build a fresh snapshot for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if any source cannot be read.
    pub async fn snapshot(
        &self,
        user: &UserSession,
    ) -> Result<ProgressSnapshot, ProgressServiceError> {
        let courses = self.courses.list_courses().await?;
        let lessons = self.lessons.list_lessons(None).await?;
        let attempts = self.attempts.list_attempts(user.user_id()).await?;
        // Unapproved questions still carry a subject for past attempts.
        let quiz_subjects: HashMap<QuizId, String> = self
            .quizzes
            .list_quizzes(false)
            .await?
            .into_iter()
            .map(|q| (q.id(), q.subject().to_string()))
            .collect();
        let stats = self.stats.get_stats(user.user_id()).await?;
        let completed = self.completion.completed_lessons()?;

        Ok(ProgressSnapshot::build(&ProgressInputs {
            courses: &courses,
            lessons: &lessons,
            completed: &completed,
            attempts: &attempts,
            quiz_subjects: &quiz_subjects,
            stats: stats.as_ref(),
        }))
    }
}
