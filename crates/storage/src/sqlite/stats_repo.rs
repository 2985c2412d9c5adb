use chrono::{DateTime, Utc};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{db, ser};
use crate::repository::{CountedTable, StatsRepository, StorageError};

fn non_negative(n: i64) -> Result<u64, StorageError> {
    u64::try_from(n).map_err(|_| StorageError::Serialization(format!("negative count: {n}")))
}

#[async_trait::async_trait]
impl StatsRepository for SqliteRepository {
    async fn count(&self, table: CountedTable) -> Result<u64, StorageError> {
        // Table names come from a closed enum, never from input.
        let sql = format!("SELECT COUNT(*) AS n FROM {}", table.table_name());
        let row = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(db)?;
        non_negative(row.try_get::<i64, _>("n").map_err(ser)?)
    }

    async fn count_users_seen_since(&self, since: DateTime<Utc>) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM users WHERE last_seen_at >= ?1")
            .bind(since)
            .fetch_one(&self.pool)
            .await
            .map_err(db)?;
        non_negative(row.try_get::<i64, _>("n").map_err(ser)?)
    }
}
