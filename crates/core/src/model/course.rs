use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CourseId, LessonId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },

    #[error("lesson order must start at 1 (got {0})")]
    InvalidOrder(i64),

    #[error("enrollment progress must be between 0 and 100 (got {0})")]
    InvalidProgress(i64),

    #[error("unknown completion status: {0}")]
    UnknownStatus(String),
}

fn required(field: &'static str, value: &str) -> Result<String, CourseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CourseError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

//
// ─── COURSE ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: String,
    pub description: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: Option<String>,
    subject: Option<String>,
    instructor_id: UserId,
    created_at: DateTime<Utc>,
}

impl Course {
    /// # Errors
    ///
    /// Returns `CourseError::MissingField` when the title is blank.
    pub fn new(
        id: CourseId,
        draft: CourseDraft,
        instructor_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CourseError> {
        Ok(Self {
            id,
            title: required("title", &draft.title)?,
            description: optional(draft.description),
            subject: optional(draft.subject),
            instructor_id,
            created_at,
        })
    }

    /// Replaces the editable fields, keeping id, instructor and creation time.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::MissingField` when the new title is blank.
    pub fn apply(&mut self, draft: CourseDraft) -> Result<(), CourseError> {
        self.title = required("title", &draft.title)?;
        self.description = optional(draft.description);
        self.subject = optional(draft.subject);
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    #[must_use]
    pub fn instructor_id(&self) -> UserId {
        self.instructor_id
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── LESSON ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDraft {
    pub course_id: Option<CourseId>,
    pub title: String,
    pub content: String,
    pub order_number: i64,
}

impl Default for LessonDraft {
    fn default() -> Self {
        Self {
            course_id: None,
            title: String::new(),
            content: String::new(),
            order_number: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    course_id: CourseId,
    title: String,
    content: String,
    order_number: u32,
}

impl Lesson {
    /// # Errors
    ///
    /// Returns `CourseError::MissingField` when the course or title is missing
    /// and `CourseError::InvalidOrder` for an order number below 1.
    pub fn new(id: LessonId, draft: LessonDraft) -> Result<Self, CourseError> {
        let course_id = draft
            .course_id
            .ok_or(CourseError::MissingField { field: "course" })?;
        let title = required("title", &draft.title)?;
        let order_number = u32::try_from(draft.order_number)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or(CourseError::InvalidOrder(draft.order_number))?;

        Ok(Self {
            id,
            course_id,
            title,
            content: draft.content,
            order_number,
        })
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn order_number(&self) -> u32 {
        self.order_number
    }
}

//
// ─── ENROLLMENT ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionStatus {
    #[default]
    InProgress,
    Completed,
}

impl CompletionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// # Errors
    ///
    /// Returns `CourseError::UnknownStatus` for unrecognised values.
    pub fn parse(value: &str) -> Result<Self, CourseError> {
        match value {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(CourseError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub user_id: UserId,
    pub course_id: CourseId,
    progress: u8,
    pub status: CompletionStatus,
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    #[must_use]
    pub fn new(user_id: UserId, course_id: CourseId, enrolled_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            course_id,
            progress: 0,
            status: CompletionStatus::InProgress,
            enrolled_at,
        }
    }

    /// # Errors
    ///
    /// Returns `CourseError::InvalidProgress` outside `0..=100`.
    pub fn from_persisted(
        user_id: UserId,
        course_id: CourseId,
        progress: i64,
        status: CompletionStatus,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Self, CourseError> {
        let progress = u8::try_from(progress)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or(CourseError::InvalidProgress(progress))?;
        Ok(Self {
            user_id,
            course_id,
            progress,
            status,
            enrolled_at,
        })
    }

    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn course_requires_title_and_trims_optionals() {
        let err = Course::new(
            CourseId::random(),
            CourseDraft::default(),
            UserId::random(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, CourseError::MissingField { field: "title" });

        let course = Course::new(
            CourseId::random(),
            CourseDraft {
                title: " Algebra ".into(),
                description: Some("   ".into()),
                subject: Some("Math".into()),
            },
            UserId::random(),
            fixed_now(),
        )
        .unwrap();
        assert_eq!(course.title(), "Algebra");
        assert_eq!(course.description(), None);
        assert_eq!(course.subject(), Some("Math"));
    }

    #[test]
    fn lesson_needs_course_title_and_positive_order() {
        let missing_course = LessonDraft {
            title: "Intro".into(),
            ..LessonDraft::default()
        };
        assert_eq!(
            Lesson::new(LessonId::random(), missing_course).unwrap_err(),
            CourseError::MissingField { field: "course" }
        );

        let zero_order = LessonDraft {
            course_id: Some(CourseId::random()),
            title: "Intro".into(),
            content: String::new(),
            order_number: 0,
        };
        assert_eq!(
            Lesson::new(LessonId::random(), zero_order).unwrap_err(),
            CourseError::InvalidOrder(0)
        );
    }

    #[test]
    fn enrollment_progress_is_bounded() {
        let now = fixed_now();
        let fresh = Enrollment::new(UserId::random(), CourseId::random(), now);
        assert_eq!(fresh.progress(), 0);
        assert_eq!(fresh.status, CompletionStatus::InProgress);

        let err = Enrollment::from_persisted(
            UserId::random(),
            CourseId::random(),
            120,
            CompletionStatus::Completed,
            now,
        )
        .unwrap_err();
        assert_eq!(err, CourseError::InvalidProgress(120));
    }
}
