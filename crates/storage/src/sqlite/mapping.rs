use aarambh_core::model::{
    AnswerOption, CompletionStatus, Course, CourseDraft, CourseId, Enrollment, Lesson,
    LessonDraft, LessonId, Note, NoteDraft, NoteId, Profile, QuizAttempt, QuizDraft, QuizId,
    QuizQuestion, ResourceId, ResourceKind, ScorePercent, StudyResource, Subject, SubjectId, UserId, UserStats,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Uuid;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Classify a driver error: constraint violations become domain outcomes,
/// everything else is a connection problem.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
        if db.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
    }
    StorageError::Connection(e.to_string())
}

/// Turn a `rows_affected` count into `NotFound` when nothing matched.
pub(crate) fn expect_affected(rows: u64) -> Result<(), StorageError> {
    if rows == 0 {
        Err(StorageError::NotFound)
    } else {
        Ok(())
    }
}

fn uuid(row: &SqliteRow, column: &str) -> Result<Uuid, StorageError> {
    row.try_get::<Uuid, _>(column).map_err(ser)
}

fn flag(row: &SqliteRow, column: &str) -> Result<bool, StorageError> {
    Ok(row.try_get::<i64, _>(column).map_err(ser)? != 0)
}

fn unsigned(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_quiz_row(row: &SqliteRow) -> Result<QuizQuestion, StorageError> {
    let correct: String = row.try_get("correct_answer").map_err(ser)?;
    let draft = QuizDraft {
        subject: row.try_get("subject").map_err(ser)?,
        question: row.try_get("question").map_err(ser)?,
        options: [
            row.try_get("option_a").map_err(ser)?,
            row.try_get("option_b").map_err(ser)?,
            row.try_get("option_c").map_err(ser)?,
            row.try_get("option_d").map_err(ser)?,
        ],
        correct: Some(AnswerOption::from_letter(&correct).map_err(ser)?),
    };
    let created_by = row
        .try_get::<Option<Uuid>, _>("created_by")
        .map_err(ser)?
        .map(UserId::new);

    QuizQuestion::from_persisted(
        QuizId::new(uuid(row, "id")?),
        draft,
        flag(row, "approved")?,
        created_by,
    )
    .map_err(ser)
}

pub(crate) fn map_attempt_row(row: &SqliteRow) -> Result<QuizAttempt, StorageError> {
    Ok(QuizAttempt::new(
        UserId::new(uuid(row, "user_id")?),
        QuizId::new(uuid(row, "quiz_id")?),
        ScorePercent::new(row.try_get::<i64, _>("score").map_err(ser)?).map_err(ser)?,
        row.try_get("attempted_at").map_err(ser)?,
    ))
}

pub(crate) fn map_course_row(row: &SqliteRow) -> Result<Course, StorageError> {
    Course::new(
        CourseId::new(uuid(row, "id")?),
        CourseDraft {
            title: row.try_get("title").map_err(ser)?,
            description: row.try_get("description").map_err(ser)?,
            subject: row.try_get("subject").map_err(ser)?,
        },
        UserId::new(uuid(row, "instructor_id")?),
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_lesson_row(row: &SqliteRow) -> Result<Lesson, StorageError> {
    Lesson::new(
        LessonId::new(uuid(row, "id")?),
        LessonDraft {
            course_id: Some(CourseId::new(uuid(row, "course_id")?)),
            title: row.try_get("title").map_err(ser)?,
            content: row.try_get("content").map_err(ser)?,
            order_number: row.try_get("order_number").map_err(ser)?,
        },
    )
    .map_err(ser)
}

pub(crate) fn map_enrollment_row(row: &SqliteRow) -> Result<Enrollment, StorageError> {
    let status: String = row.try_get("status").map_err(ser)?;
    Enrollment::from_persisted(
        UserId::new(uuid(row, "user_id")?),
        CourseId::new(uuid(row, "course_id")?),
        row.try_get("progress").map_err(ser)?,
        CompletionStatus::parse(&status).map_err(ser)?,
        row.try_get("enrolled_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_note_row(row: &SqliteRow) -> Result<Note, StorageError> {
    let mut note = Note::new(
        NoteId::new(uuid(row, "id")?),
        UserId::new(uuid(row, "owner_id")?),
        NoteDraft {
            title: row.try_get("title").map_err(ser)?,
            content: row.try_get("content").map_err(ser)?,
            subject: row.try_get("subject").map_err(ser)?,
            file_url: row.try_get("file_url").map_err(ser)?,
        },
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)?;
    note.favorite = flag(row, "is_favorite")?;
    note.archived = flag(row, "is_archived")?;
    note.approved = flag(row, "approved")?;
    Ok(note)
}

pub(crate) fn map_subject_row(row: &SqliteRow) -> Result<Subject, StorageError> {
    Subject::new(
        SubjectId::new(uuid(row, "id")?),
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get("description").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_resource_row(row: &SqliteRow) -> Result<StudyResource, StorageError> {
    let kind: String = row.try_get("resource_type").map_err(ser)?;
    let url: String = row.try_get("url").map_err(ser)?;
    StudyResource::new(
        ResourceId::new(uuid(row, "id")?),
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("subject").map_err(ser)?,
        ResourceKind::parse(&kind).map_err(ser)?,
        &url,
        flag(row, "approved")?,
        row.try_get("uploaded_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_profile_row(row: &SqliteRow) -> Result<Profile, StorageError> {
    Ok(Profile::new(
        UserId::new(uuid(row, "user_id")?),
        row.try_get("name").map_err(ser)?,
        row.try_get("email").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    ))
}

pub(crate) fn map_stats_row(row: &SqliteRow) -> Result<UserStats, StorageError> {
    let achievements = row
        .try_get::<Option<String>, _>("achievements")
        .map_err(ser)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(ser)?;
    Ok(UserStats {
        user_id: UserId::new(uuid(row, "user_id")?),
        current_streak: unsigned(
            "current_streak",
            row.try_get("current_streak").map_err(ser)?,
        )?,
        total_points: unsigned("total_points", row.try_get("total_points").map_err(ser)?)?,
        achievements,
    })
}
