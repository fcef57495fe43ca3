use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::Storage;

mod catalog_repo;
mod course_repo;
mod mapping;
mod migrate;
mod note_repo;
mod quiz_repo;
mod user_repo;

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// `sqlite::memory:` and `mode=memory` URLs live only as long as a connection
/// holds them, and each private in-memory connection is its own database.
fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

impl SqliteRepository {
    /// Open a pool for `database_url` with foreign keys enforced.
    ///
    /// File databases get WAL and a busy timeout. In-memory databases are
    /// pinned to a single, never-idled connection so the schema survives.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the pool cannot connect or a pragma fails.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let memory = is_memory_url(database_url);
        let options = if memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = options
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA foreign_keys = ON;")
                        .execute(&mut *conn)
                        .await?;
                    if !memory {
                        sqlx::query("PRAGMA journal_mode = WAL;")
                            .execute(&mut *conn)
                            .await?;
                        sqlx::query("PRAGMA busy_timeout = 5000;")
                            .execute(&mut *conn)
                            .await?;
                    }
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        tracing::debug!(database_url, memory, "sqlite pool ready");
        Ok(Self { pool })
    }

    /// Create or upgrade the schema.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if a migration statement fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Build a `Storage` backed by `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        Ok(Self::from_backend(repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{CourseRepository, QuizRepository};

    #[test]
    fn memory_urls_are_detected() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url("sqlite:file:aarambh?mode=memory&cache=shared"));
        assert!(!is_memory_url("sqlite:///tmp/aarambh.sqlite3"));
    }

    #[tokio::test]
    async fn private_memory_database_keeps_its_schema() {
        let storage = Storage::sqlite("sqlite::memory:").await.unwrap();
        assert!(storage.courses.list_courses().await.unwrap().is_empty());
        assert!(storage.quizzes.list_quizzes(false).await.unwrap().is_empty());
    }
}
