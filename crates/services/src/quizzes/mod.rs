mod session;
mod workflow;

pub use crate::error::{QuizServiceError, QuizSessionError};
pub use session::{Advance, QuizProgress, QuizResult, QuizSession};
pub use workflow::{AttemptPersistence, QuizStep, QuizWorkflow};
