use aarambh_core::model::{Profile, Role, UserId, UserStats};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{db_err, map_profile_row, map_stats_row, ser};
use crate::repository::{ProfileRepository, RoleRepository, StorageError, UserStatsRepository};

#[async_trait::async_trait]
impl RoleRepository for SqliteRepository {
    async fn role_for(&self, user_id: UserId) -> Result<Option<Role>, StorageError> {
        let row = sqlx::query("SELECT role FROM user_roles WHERE user_id = ?1")
            .bind(user_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|r| {
            let raw: String = r.try_get("role").map_err(ser)?;
            Role::parse(&raw).map_err(ser)
        })
        .transpose()
    }

    async fn set_role(&self, user_id: UserId, role: Role) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_roles (user_id, role) VALUES (?1, ?2)
            ON CONFLICT(user_id) DO UPDATE SET role = excluded.role
            ",
        )
        .bind(user_id.value())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO profiles (user_id, name, email, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email
            ",
        )
        .bind(profile.user_id().value())
        .bind(profile.name().map(str::to_owned))
        .bind(profile.email().map(str::to_owned))
        .bind(profile.created_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError> {
        let row = sqlx::query(
            "SELECT user_id, name, email, created_at FROM profiles WHERE user_id = ?1",
        )
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(map_profile_row).transpose()
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StorageError> {
        let rows = sqlx::query(
            "SELECT user_id, name, email, created_at FROM profiles ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_profile_row).collect()
    }
}

#[async_trait::async_trait]
impl UserStatsRepository for SqliteRepository {
    async fn get_stats(&self, user_id: UserId) -> Result<Option<UserStats>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, current_streak, total_points, achievements
            FROM user_stats WHERE user_id = ?1
            ",
        )
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(map_stats_row).transpose()
    }

    async fn upsert_stats(&self, stats: &UserStats) -> Result<(), StorageError> {
        let achievements = stats
            .achievements
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(ser)?;
        sqlx::query(
            r"
            INSERT INTO user_stats (user_id, current_streak, total_points, achievements)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                current_streak = excluded.current_streak,
                total_points = excluded.total_points,
                achievements = excluded.achievements
            ",
        )
        .bind(stats.user_id.value())
        .bind(i64::from(stats.current_streak))
        .bind(i64::from(stats.total_points))
        .bind(achievements)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}
