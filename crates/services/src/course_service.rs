use std::sync::Arc;

use aarambh_core::model::{Course, CourseId, Enrollment, Lesson, LessonId, UserSession};
use storage::repository::{
    CourseRepository, EnrollmentRepository, LessonRepository, StorageError,
};

use crate::Clock;
use crate::error::CourseServiceError;

/// Browsing courses and lessons, and enrolling in them.
#[derive(Clone)]
pub struct CourseService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
    lessons: Arc<dyn LessonRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl CourseService {
    #[must_use]
    pub fn new(
        clock: Clock,
        courses: Arc<dyn CourseRepository>,
        lessons: Arc<dyn LessonRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self {
            clock,
            courses,
            lessons,
            enrollments,
        }
    }

    /// Newest first.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` on repository failures.
    pub async fn list_courses(&self) -> Result<Vec<Course>, CourseServiceError> {
        Ok(self.courses.list_courses().await?)
    }

    /// # Errors
    ///
    /// Returns `CourseServiceError::CourseNotFound` if the course does not exist.
    pub async fn course(&self, id: CourseId) -> Result<Course, CourseServiceError> {
        self.courses
            .get_course(id)
            .await?
            .ok_or(CourseServiceError::CourseNotFound)
    }

    /// Lessons of a course in `order_number` order.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` on repository failures.
    pub async fn list_lessons(&self, course: CourseId) -> Result<Vec<Lesson>, CourseServiceError> {
        Ok(self.lessons.list_lessons(Some(course)).await?)
    }

    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` on repository failures.
    pub async fn lesson(&self, id: LessonId) -> Result<Option<Lesson>, CourseServiceError> {
        Ok(self.lessons.get_lesson(id).await?)
    }

    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` on repository failures.
    pub async fn enrollments(
        &self,
        user: &UserSession,
    ) -> Result<Vec<Enrollment>, CourseServiceError> {
        Ok(self.enrollments.list_enrollments(user.user_id()).await?)
    }

    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` on repository failures.
    pub async fn is_enrolled(
        &self,
        user: &UserSession,
        course: CourseId,
    ) -> Result<bool, CourseServiceError> {
        Ok(self
            .enrollments(user)
            .await?
            .iter()
            .any(|e| e.course_id == course))
    }

    /// Stored progress for the course, `0` when not enrolled.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` on repository failures.
    pub async fn enrollment_progress(
        &self,
        user: &UserSession,
        course: CourseId,
    ) -> Result<u8, CourseServiceError> {
        Ok(self
            .enrollments(user)
            .await?
            .iter()
            .find(|e| e.course_id == course)
            .map_or(0, Enrollment::progress))
    }

    /// # Errors
    ///
    /// Returns `CourseServiceError::AlreadyEnrolled` on a second enrollment and
    /// `CourseServiceError::CourseNotFound` for an unknown course.
    pub async fn enroll(
        &self,
        user: &UserSession,
        course: CourseId,
    ) -> Result<Enrollment, CourseServiceError> {
        let enrollment = Enrollment::new(user.user_id(), course, self.clock.now());
        match self.enrollments.insert_enrollment(&enrollment).await {
            Ok(()) => {
                tracing::info!(user = %user.user_id(), %course, "enrolled");
                Ok(enrollment)
            }
            Err(StorageError::Conflict) => Err(CourseServiceError::AlreadyEnrolled),
            Err(StorageError::NotFound) => Err(CourseServiceError::CourseNotFound),
            Err(other) => Err(other.into()),
        }
    }
}
