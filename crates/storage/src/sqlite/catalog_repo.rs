use aarambh_core::model::{ResourceId, StudyResource, Subject, SubjectId};

use super::SqliteRepository;
use super::mapping::{db_err, expect_affected, map_resource_row, map_subject_row};
use crate::repository::{ResourceRepository, StorageError, SubjectRepository};

#[async_trait::async_trait]
impl SubjectRepository for SqliteRepository {
    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError> {
        // A clash on `name` surfaces as a unique violation, i.e. `Conflict`.
        sqlx::query(
            r"
            INSERT INTO subjects (id, name, description)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description
            ",
        )
        .bind(subject.id().value())
        .bind(subject.name().to_owned())
        .bind(subject.description().map(ToOwned::to_owned))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, name, description FROM subjects ORDER BY name COLLATE BINARY ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_subject_row).collect()
    }

    async fn delete_subject(&self, id: SubjectId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM subjects WHERE id = ?1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        expect_affected(res.rows_affected())
    }
}

#[async_trait::async_trait]
impl ResourceRepository for SqliteRepository {
    async fn upsert_resource(&self, resource: &StudyResource) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO study_resources
                (id, title, subject, resource_type, url, approved, uploaded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                subject = excluded.subject,
                resource_type = excluded.resource_type,
                url = excluded.url,
                approved = excluded.approved
            ",
        )
        .bind(resource.id().value())
        .bind(resource.title().to_owned())
        .bind(resource.subject().to_owned())
        .bind(resource.kind().as_str())
        .bind(resource.url().to_string())
        .bind(i64::from(resource.approved))
        .bind(resource.uploaded_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_resources(
        &self,
        approved_only: bool,
    ) -> Result<Vec<StudyResource>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, subject, resource_type, url, approved, uploaded_at
            FROM study_resources
            WHERE (?1 = 0 OR approved = 1)
            ORDER BY uploaded_at DESC, title ASC
            ",
        )
        .bind(i64::from(approved_only))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_resource_row).collect()
    }

    async fn set_resource_approved(
        &self,
        id: ResourceId,
        approved: bool,
    ) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE study_resources SET approved = ?2 WHERE id = ?1")
            .bind(id.value())
            .bind(i64::from(approved))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        expect_affected(res.rows_affected())
    }

    async fn delete_resource(&self, id: ResourceId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM study_resources WHERE id = ?1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        expect_affected(res.rows_affected())
    }
}
