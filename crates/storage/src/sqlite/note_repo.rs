use aarambh_core::model::{Note, NoteId, UserId};

use super::SqliteRepository;
use super::mapping::{db_err, expect_affected, map_note_row};
use crate::repository::{NoteRepository, StorageError};

#[async_trait::async_trait]
impl NoteRepository for SqliteRepository {
    async fn upsert_note(&self, note: &Note) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO notes (
                id, owner_id, title, content, subject, file_url,
                is_favorite, is_archived, approved, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                subject = excluded.subject,
                file_url = excluded.file_url,
                is_favorite = excluded.is_favorite,
                is_archived = excluded.is_archived,
                approved = excluded.approved
            ",
        )
        .bind(note.id().value())
        .bind(note.owner().value())
        .bind(note.title().to_owned())
        .bind(note.content().to_owned())
        .bind(note.subject().to_owned())
        .bind(note.file_url().map(ToString::to_string))
        .bind(i64::from(note.favorite))
        .bind(i64::from(note.archived))
        .bind(i64::from(note.approved))
        .bind(note.created_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_note(&self, id: NoteId) -> Result<Option<Note>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, owner_id, title, content, subject, file_url,
                   is_favorite, is_archived, approved, created_at
            FROM notes WHERE id = ?1
            ",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(map_note_row).transpose()
    }

    async fn list_notes(&self, owner: Option<UserId>) -> Result<Vec<Note>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, owner_id, title, content, subject, file_url,
                   is_favorite, is_archived, approved, created_at
            FROM notes
            WHERE (?1 IS NULL OR owner_id = ?1)
            ORDER BY created_at DESC, title ASC
            ",
        )
        .bind(owner.map(|o| o.value()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_note_row).collect()
    }

    async fn delete_note(&self, id: NoteId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM notes WHERE id = ?1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        expect_affected(res.rows_affected())
    }
}
