use chrono::{DateTime, Utc};
use study_core::model::{FolderId, StudySetExperience, StudySetId, TermId, UserId};

use super::SqliteRepository;
use super::mapping::{db, map_experience_row, to_i64};
use crate::repository::{ExperienceRepository, StorageError};

#[async_trait::async_trait]
impl ExperienceRepository for SqliteRepository {
    async fn complete_round(
        &self,
        user_id: UserId,
        study_set_id: StudySetId,
        at: DateTime<Utc>,
    ) -> Result<StudySetExperience, StorageError> {
        let user = to_i64("user_id", user_id.value())?;
        let set = to_i64("study_set_id", study_set_id.value())?;

        let mut tx = self.pool.begin().await.map_err(db)?;

        sqlx::query(
            r"
            INSERT INTO study_set_experiences (user_id, study_set_id, rounds_completed, last_round_at)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT(user_id, study_set_id) DO UPDATE SET
                rounds_completed = rounds_completed + 1,
                last_round_at = excluded.last_round_at
            ",
        )
        .bind(user)
        .bind(set)
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(db)?;

        let row = sqlx::query(
            r"
            SELECT user_id, study_set_id, rounds_completed, last_round_at
            FROM study_set_experiences
            WHERE user_id = ?1 AND study_set_id = ?2
            ",
        )
        .bind(user)
        .bind(set)
        .fetch_one(&mut *tx)
        .await
        .map_err(db)?;

        tx.commit().await.map_err(db)?;
        map_experience_row(&row)
    }

    async fn get_experience(
        &self,
        user_id: UserId,
        study_set_id: StudySetId,
    ) -> Result<Option<StudySetExperience>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, study_set_id, rounds_completed, last_round_at
            FROM study_set_experiences
            WHERE user_id = ?1 AND study_set_id = ?2
            ",
        )
        .bind(to_i64("user_id", user_id.value())?)
        .bind(to_i64("study_set_id", study_set_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.as_ref().map(map_experience_row).transpose()
    }

    async fn record_folder_visit(
        &self,
        user_id: UserId,
        folder_id: FolderId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO folder_experiences (user_id, folder_id, viewed_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id, folder_id) DO UPDATE SET viewed_at = excluded.viewed_at
            ",
        )
        .bind(to_i64("user_id", user_id.value())?)
        .bind(to_i64("folder_id", folder_id.value())?)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn record_studiable_term(
        &self,
        user_id: UserId,
        term_id: TermId,
        round: u32,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO studiable_terms (user_id, term_id, appeared_in_round)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id, term_id) DO UPDATE SET
                appeared_in_round = excluded.appeared_in_round
            ",
        )
        .bind(to_i64("user_id", user_id.value())?)
        .bind(to_i64("term_id", term_id.value())?)
        .bind(i64::from(round))
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }
}
