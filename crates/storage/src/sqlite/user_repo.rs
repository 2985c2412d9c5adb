use chrono::{DateTime, Utc};
use study_core::model::{User, UserId, Username};

use super::SqliteRepository;
use super::mapping::{db, map_user_row, to_i64};
use crate::repository::{StorageError, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO users (id, username, name, image, verified, last_seen_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                name = excluded.name,
                image = excluded.image,
                verified = excluded.verified,
                last_seen_at = excluded.last_seen_at
            ",
        )
        .bind(to_i64("user_id", user.id.value())?)
        .bind(user.username.as_str())
        .bind(user.name.as_deref())
        .bind(user.image.as_deref())
        .bind(i64::from(user.verified))
        .bind(user.last_seen_at)
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, username, name, image, verified, last_seen_at
            FROM users WHERE id = ?1
            ",
        )
        .bind(to_i64("user_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, username, name, image, verified, last_seen_at
            FROM users WHERE username = ?1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE users SET last_seen_at = ?2 WHERE id = ?1")
            .bind(to_i64("user_id", id.value())?)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(db)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
