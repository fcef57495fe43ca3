use aarambh_core::model::{Course, CourseId, Enrollment, Lesson, LessonId, UserId};

use super::SqliteRepository;
use super::mapping::{
    db_err, expect_affected, map_course_row, map_enrollment_row, map_lesson_row,
};
use crate::repository::{CourseRepository, EnrollmentRepository, LessonRepository, StorageError};

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO courses (id, title, description, subject, instructor_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                -- instructor and creation time are fixed at first insert
                title = excluded.title,
                description = excluded.description,
                subject = excluded.subject
            ",
        )
        .bind(course.id().value())
        .bind(course.title().to_owned())
        .bind(course.description().map(ToOwned::to_owned))
        .bind(course.subject().map(ToOwned::to_owned))
        .bind(course.instructor_id().value())
        .bind(course.created_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, description, subject, instructor_id, created_at
            FROM courses WHERE id = ?1
            ",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(map_course_row).transpose()
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, description, subject, instructor_id, created_at
            FROM courses
            ORDER BY created_at DESC, title ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_course_row).collect()
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM courses WHERE id = ?1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        expect_affected(res.rows_affected())
    }
}

#[async_trait::async_trait]
impl LessonRepository for SqliteRepository {
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO lessons (id, course_id, title, content, order_number)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                course_id = excluded.course_id,
                title = excluded.title,
                content = excluded.content,
                order_number = excluded.order_number
            ",
        )
        .bind(lesson.id().value())
        .bind(lesson.course_id().value())
        .bind(lesson.title().to_owned())
        .bind(lesson.content().to_owned())
        .bind(i64::from(lesson.order_number()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        let row = sqlx::query(
            "SELECT id, course_id, title, content, order_number FROM lessons WHERE id = ?1",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(map_lesson_row).transpose()
    }

    async fn list_lessons(&self, course_id: Option<CourseId>) -> Result<Vec<Lesson>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, course_id, title, content, order_number
            FROM lessons
            WHERE (?1 IS NULL OR course_id = ?1)
            ORDER BY course_id ASC, order_number ASC, title ASC
            ",
        )
        .bind(course_id.map(|c| c.value()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_lesson_row).collect()
    }

    async fn delete_lesson(&self, id: LessonId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM lessons WHERE id = ?1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        expect_affected(res.rows_affected())
    }
}

#[async_trait::async_trait]
impl EnrollmentRepository for SqliteRepository {
    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO enrollments (user_id, course_id, progress, status, enrolled_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(enrollment.user_id.value())
        .bind(enrollment.course_id.value())
        .bind(i64::from(enrollment.progress()))
        .bind(enrollment.status.as_str())
        .bind(enrollment.enrolled_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_enrollments(&self, user_id: UserId) -> Result<Vec<Enrollment>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, course_id, progress, status, enrolled_at
            FROM enrollments
            WHERE user_id = ?1
            ORDER BY enrolled_at ASC
            ",
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_enrollment_row).collect()
    }
}
