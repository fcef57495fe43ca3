use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

const SCHEMA_V1: &[&str] = &[
    r"
        CREATE TABLE IF NOT EXISTS subjects (
            id BLOB PRIMARY KEY,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            description TEXT
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS quizzes (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id BLOB NOT NULL UNIQUE,
            subject TEXT NOT NULL,
            question TEXT NOT NULL,
            option_a TEXT NOT NULL,
            option_b TEXT NOT NULL,
            option_c TEXT NOT NULL,
            option_d TEXT NOT NULL,
            correct_answer TEXT NOT NULL CHECK (correct_answer IN ('A', 'B', 'C', 'D')),
            approved INTEGER NOT NULL DEFAULT 0,
            created_by BLOB
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS quiz_attempts (
            id INTEGER PRIMARY KEY,
            user_id BLOB NOT NULL,
            quiz_id BLOB NOT NULL,
            score INTEGER NOT NULL CHECK (score BETWEEN 0 AND 100),
            attempted_at TEXT NOT NULL,
            FOREIGN KEY (quiz_id) REFERENCES quizzes(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS courses (
            id BLOB PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            subject TEXT,
            instructor_id BLOB NOT NULL,
            created_at TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS lessons (
            id BLOB PRIMARY KEY,
            course_id BLOB NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            order_number INTEGER NOT NULL CHECK (order_number >= 1),
            FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS enrollments (
            user_id BLOB NOT NULL,
            course_id BLOB NOT NULL,
            progress INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
            status TEXT NOT NULL,
            enrolled_at TEXT NOT NULL,
            PRIMARY KEY (user_id, course_id),
            FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS notes (
            id BLOB PRIMARY KEY,
            owner_id BLOB NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            subject TEXT NOT NULL,
            file_url TEXT,
            is_favorite INTEGER NOT NULL DEFAULT 0,
            is_archived INTEGER NOT NULL DEFAULT 0,
            approved INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS study_resources (
            id BLOB PRIMARY KEY,
            title TEXT NOT NULL,
            subject TEXT NOT NULL,
            resource_type TEXT NOT NULL,
            url TEXT NOT NULL,
            approved INTEGER NOT NULL DEFAULT 0
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS user_roles (
            user_id BLOB PRIMARY KEY,
            role TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS user_stats (
            user_id BLOB PRIMARY KEY,
            current_streak INTEGER NOT NULL DEFAULT 0 CHECK (current_streak >= 0),
            total_points INTEGER NOT NULL DEFAULT 0 CHECK (total_points >= 0),
            achievements TEXT
        );
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_quiz_attempts_user
            ON quiz_attempts (user_id, attempted_at);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_lessons_course_order
            ON lessons (course_id, order_number);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_notes_owner_created
            ON notes (owner_id, created_at);
    ",
];

/// Upload times for resources, the user directory, and the instructor role name.
const SCHEMA_V2: &[&str] = &[
    r"
        UPDATE user_roles SET role = 'instructor' WHERE role = 'teacher';
    ",
    r"
        ALTER TABLE study_resources
            ADD COLUMN uploaded_at TEXT NOT NULL DEFAULT '1970-01-01T00:00:00+00:00';
    ",
    r"
        CREATE TABLE IF NOT EXISTS profiles (
            user_id BLOB PRIMARY KEY,
            name TEXT,
            email TEXT,
            created_at TEXT NOT NULL
        );
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_study_resources_uploaded
            ON study_resources (uploaded_at);
    ",
];

const MIGRATIONS: &[(i64, &[&str])] = &[(1, SCHEMA_V1), (2, SCHEMA_V2)];

/// Applies every schema version not yet recorded in `schema_migrations`.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    for &(version, statements) in MIGRATIONS {
        if is_applied(pool, version).await? {
            continue;
        }
        let mut tx = pool.begin().await?;

        for statement in statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(version)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(version, "applied schema migration");
    }

    Ok(())
}
