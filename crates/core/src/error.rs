use thiserror::Error;

use crate::model::{AttemptError, CatalogError, CourseError, NoteError, QuizError, UserError};

/// Any domain validation failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Note(#[from] NoteError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    User(#[from] UserError),
}
