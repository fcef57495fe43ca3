//! Shared error types for the services crate.

use thiserror::Error;

use aarambh_core::model::{AttemptError, CourseError, NoteError, QuizError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors raised by the in-memory quiz state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("no questions available for this quiz")]
    Empty,
    #[error("select an answer before continuing")]
    NoAnswerSelected,
    #[error("quiz already completed")]
    Completed,
    #[error(transparent)]
    Score(#[from] AttemptError),
}

/// Errors emitted by `QuizWorkflow`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error(transparent)]
    Session(#[from] QuizSessionError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CompletionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompletionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CourseService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseServiceError {
    #[error("already enrolled in this course")]
    AlreadyEnrolled,
    #[error("course not found")]
    CourseNotFound,
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `NoteService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NoteServiceError {
    #[error("note not found")]
    NotFound,
    #[error(transparent)]
    Validation(#[from] NoteError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ResourceService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResourceServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AdminService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdminError {
    #[error("admin role required")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("a subject with that name already exists")]
    DuplicateSubject,
    #[error(transparent)]
    Validation(#[from] aarambh_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by authentication backends and `SessionManager`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("no authentication backend is configured")]
    NotConfigured,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email and password are required")]
    MissingCredentials,
    #[error("not signed in")]
    NoSession,
    #[error("session expired, sign in again")]
    Expired,
    #[error("auth request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("unexpected auth response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
