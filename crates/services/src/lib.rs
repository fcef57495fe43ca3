#![forbid(unsafe_code)]

pub mod admin_service;
pub mod app_services;
pub mod auth;
pub mod completion;
pub mod course_service;
pub mod error;
pub mod note_service;
pub mod notice;
pub mod progress_service;
pub mod quizzes;
pub mod resource_service;

pub use aarambh_core::Clock;

pub use admin_service::{
    AdminEntity, AdminService, AdminStats, ModerationTarget, PendingReview, ResourceDraft,
    UserSummary,
};
pub use app_services::{AppServices, ServiceOptions};
pub use auth::{AuthBackend, GoTrueAuth, GoTrueConfig, SessionManager};
pub use completion::{CompletionService, Toggled};
pub use course_service::CourseService;
pub use error::{
    AdminError, AppServicesError, AuthError, CompletionError, CourseServiceError,
    NoteServiceError, ProgressServiceError, QuizServiceError, QuizSessionError,
    ResourceServiceError,
};
pub use note_service::NoteService;
pub use notice::{Notice, NoticeKind};
pub use progress_service::ProgressService;
pub use quizzes::{AttemptPersistence, QuizSession, QuizStep, QuizWorkflow};
pub use resource_service::{ALL_SUBJECTS, ResourceFilter, ResourceService};
