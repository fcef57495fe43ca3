use std::sync::Arc;

use aarambh_core::model::UserSession;
use services::{
    AdminService, AppServices, AuthError, CompletionService, CourseService, NoteService, ProgressService,
    QuizWorkflow, ResourceService, SessionManager,
};

use crate::platform::{DesktopLinkOpener, LinkOpenerRef};
use crate::views::ViewError;

/// What the desktop shell (or a test) hands to the UI.
pub trait UiApp: Send + Sync {
    fn app_name(&self) -> &str {
        "Aarambh"
    }

    fn link_opener(&self) -> LinkOpenerRef {
        Arc::new(DesktopLinkOpener)
    }

    fn sessions(&self) -> Arc<SessionManager>;
    fn quizzes(&self) -> Arc<QuizWorkflow>;
    fn progress(&self) -> Arc<ProgressService>;
    fn completion(&self) -> Arc<CompletionService>;
    fn courses(&self) -> Arc<CourseService>;
    fn notes(&self) -> Arc<NoteService>;
    fn resources(&self) -> Arc<ResourceService>;
    fn admin(&self) -> Arc<AdminService>;
}

impl UiApp for AppServices {
    fn sessions(&self) -> Arc<SessionManager> {
        AppServices::sessions(self)
    }

    fn quizzes(&self) -> Arc<QuizWorkflow> {
        AppServices::quizzes(self)
    }

    fn progress(&self) -> Arc<ProgressService> {
        AppServices::progress(self)
    }

    fn completion(&self) -> Arc<CompletionService> {
        AppServices::completion(self)
    }

    fn courses(&self) -> Arc<CourseService> {
        AppServices::courses(self)
    }

    fn notes(&self) -> Arc<NoteService> {
        AppServices::notes(self)
    }

    fn resources(&self) -> Arc<ResourceService> {
        AppServices::resources(self)
    }

    fn admin(&self) -> Arc<AdminService> {
        AppServices::admin(self)
    }
}

#[derive(Clone)]
pub struct AppContext {
    app_name: String,
    links: LinkOpenerRef,
    sessions: Arc<SessionManager>,
    quizzes: Arc<QuizWorkflow>,
    progress: Arc<ProgressService>,
    completion: Arc<CompletionService>,
    courses: Arc<CourseService>,
    notes: Arc<NoteService>,
    resources: Arc<ResourceService>,
    admin: Arc<AdminService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            app_name: app.app_name().to_string(),
            links: app.link_opener(),
            sessions: app.sessions(),
            quizzes: app.quizzes(),
            progress: app.progress(),
            completion: app.completion(),
            courses: app.courses(),
            notes: app.notes(),
            resources: app.resources(),
            admin: app.admin(),
        }
    }

    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn open_url(&self, url: &str) {
        self.links.open_url(url);
    }

    /// The signed-in user, mapped for views.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::SignedOut` when there is no live session.
    pub fn user(&self) -> Result<UserSession, ViewError> {
        self.sessions.current().map_err(|err| match err {
            AuthError::NoSession | AuthError::Expired => ViewError::SignedOut,
            other => ViewError::failed(other),
        })
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

// Provided by the composition root (`crates/app`) or the view test harness.

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
