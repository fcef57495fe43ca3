mod attempt;
mod catalog;
mod course;
mod ids;
mod note;
mod quiz;
mod user;

pub use ids::{CourseId, LessonId, NoteId, ParseIdError, QuizId, ResourceId, SubjectId, UserId};

pub use attempt::{AttemptError, AttemptRecording, QuizAttempt, ScorePercent};
pub use catalog::{CatalogError, ResourceKind, StudyResource, Subject};
pub use course::{
    CompletionStatus, Course, CourseDraft, CourseError, Enrollment, Lesson, LessonDraft,
};
pub use note::{Note, NoteDraft, NoteError};
pub use quiz::{AnswerOption, QuizDraft, QuizError, QuizQuestion, QuizSet};
pub use user::{Profile, Role, UserError, UserSession, UserStats};
