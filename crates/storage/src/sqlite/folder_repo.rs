use study_core::model::{Folder, FolderId, FolderSummary, StudySetId, UserId};

use super::SqliteRepository;
use super::mapping::{db, map_folder_summary_row, to_i64};
use crate::repository::{FolderRepository, StorageError};

#[async_trait::async_trait]
impl FolderRepository for SqliteRepository {
    async fn upsert_folder(&self, folder: &Folder) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO folders (id, user_id, title, slug, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                slug = excluded.slug
            ",
        )
        .bind(to_i64("folder_id", folder.id.value())?)
        .bind(to_i64("user_id", folder.user_id.value())?)
        .bind(&folder.title)
        .bind(&folder.slug)
        .bind(folder.created_at)
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn add_study_set(
        &self,
        folder_id: FolderId,
        study_set_id: StudySetId,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO study_sets_on_folders (folder_id, study_set_id)
            VALUES (?1, ?2)
            ON CONFLICT(folder_id, study_set_id) DO NOTHING
            ",
        )
        .bind(to_i64("folder_id", folder_id.value())?)
        .bind(to_i64("study_set_id", study_set_id.value())?)
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn list_folders_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FolderSummary>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT f.id, f.title, f.slug, COUNT(sf.study_set_id) AS study_set_count
            FROM folders f
            LEFT JOIN study_sets_on_folders sf ON sf.folder_id = f.id
            WHERE f.user_id = ?1
            GROUP BY f.id
            ORDER BY f.created_at DESC, f.id ASC
            ",
        )
        .bind(to_i64("user_id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.iter().map(map_folder_summary_row).collect()
    }
}
