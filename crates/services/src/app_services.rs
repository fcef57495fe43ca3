use std::sync::Arc;

use aarambh_core::model::AttemptRecording;
use storage::local::{KeyValueStore, MemoryStore};
use storage::repository::Storage;

use crate::Clock;
use crate::admin_service::AdminService;
use crate::auth::{AuthBackend, SessionManager};
use crate::completion::CompletionService;
use crate::course_service::CourseService;
use crate::error::AppServicesError;
use crate::note_service::NoteService;
use crate::progress_service::ProgressService;
use crate::quizzes::QuizWorkflow;
use crate::resource_service::ResourceService;

/// Knobs that change service behavior rather than wiring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceOptions {
    pub attempt_recording: AttemptRecording,
    pub shuffle_quizzes: bool,
}

/// Assembles every app-facing service over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    sessions: Arc<SessionManager>,
    quizzes: Arc<QuizWorkflow>,
    progress: Arc<ProgressService>,
    completion: Arc<CompletionService>,
    courses: Arc<CourseService>,
    notes: Arc<NoteService>,
    resources: Arc<ResourceService>,
    admin: Arc<AdminService>,
}

impl AppServices {
    #[must_use]
    pub fn new(
        clock: Clock,
        storage: &Storage,
        local: Arc<dyn KeyValueStore>,
        auth: Option<Arc<dyn AuthBackend>>,
        options: ServiceOptions,
    ) -> Self {
        let completion = Arc::new(CompletionService::new(local));
        let quizzes = QuizWorkflow::new(
            clock,
            Arc::clone(&storage.quizzes),
            Arc::clone(&storage.attempts),
        )
        .with_recording(options.attempt_recording)
        .with_shuffle(options.shuffle_quizzes);
        let progress = ProgressService::new(
            Arc::clone(&storage.courses),
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.quizzes),
            Arc::clone(&storage.attempts),
            Arc::clone(&storage.stats),
            Arc::clone(&completion),
        );
        let courses = CourseService::new(
            clock,
            Arc::clone(&storage.courses),
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.enrollments),
        );

        Self {
            sessions: Arc::new(SessionManager::new(
                clock,
                Arc::clone(&storage.roles),
                Arc::clone(&storage.profiles),
                auth,
            )),
            quizzes: Arc::new(quizzes),
            progress: Arc::new(progress),
            completion,
            courses: Arc::new(courses),
            notes: Arc::new(NoteService::new(clock, Arc::clone(&storage.notes))),
            resources: Arc::new(ResourceService::new(Arc::clone(&storage.resources))),
            admin: Arc::new(AdminService::new(clock, storage.clone())),
        }
    }

    /// Everything in memory; handy for tests and demos.
    #[must_use]
    pub fn in_memory(clock: Clock, options: ServiceOptions) -> Self {
        Self::new(
            clock,
            &Storage::in_memory(),
            Arc::new(MemoryStore::new()),
            None,
            options,
        )
    }

    /// Build services backed by `SQLite`, migrating the database first.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        local: Arc<dyn KeyValueStore>,
        clock: Clock,
        auth: Option<Arc<dyn AuthBackend>>,
        options: ServiceOptions,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        tracing::info!(
            db_url,
            recording = options.attempt_recording.as_str(),
            shuffle = options.shuffle_quizzes,
            "services ready"
        );
        Ok(Self::new(clock, &storage, local, auth, options))
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<SessionManager> {
        Arc::clone(&self.sessions)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizWorkflow> {
        Arc::clone(&self.quizzes)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn completion(&self) -> Arc<CompletionService> {
        Arc::clone(&self.completion)
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseService> {
        Arc::clone(&self.courses)
    }

    #[must_use]
    pub fn notes(&self) -> Arc<NoteService> {
        Arc::clone(&self.notes)
    }

    #[must_use]
    pub fn resources(&self) -> Arc<ResourceService> {
        Arc::clone(&self.resources)
    }

    #[must_use]
    pub fn admin(&self) -> Arc<AdminService> {
        Arc::clone(&self.admin)
    }
}
