use sqlx::Row;
use study_core::model::{StudySet, StudySetId, StudySetSummary, TermId, UserId, Visibility};

use super::SqliteRepository;
use super::mapping::{
    db, map_study_set_summary_row, map_term_row, ser, study_set_id, term_id, to_i64, user_id,
};
use crate::repository::{StorageError, StudySetRepository};

#[async_trait::async_trait]
impl StudySetRepository for SqliteRepository {
    async fn upsert_study_set(&self, set: &StudySet) -> Result<(), StorageError> {
        let set_id = to_i64("study_set_id", set.id.value())?;
        let mut tx = self.pool.begin().await.map_err(db)?;

        sqlx::query(
            r"
            INSERT INTO study_sets (id, user_id, title, description, created_at, visibility)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                visibility = excluded.visibility
            ",
        )
        .bind(set_id)
        .bind(to_i64("user_id", set.user_id.value())?)
        .bind(&set.title)
        .bind(&set.description)
        .bind(set.created_at)
        .bind(set.visibility.as_str())
        .execute(&mut *tx)
        .await
        .map_err(db)?;

        // Keep rows of surviving terms so stars and progress stay attached.
        let existing = sqlx::query("SELECT id FROM terms WHERE study_set_id = ?1")
            .bind(set_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(db)?;
        for row in existing {
            let id = term_id(&row, "id")?;
            if !set.terms.iter().any(|t| t.id == id) {
                sqlx::query("DELETE FROM terms WHERE id = ?1")
                    .bind(to_i64("term_id", id.value())?)
                    .execute(&mut *tx)
                    .await
                    .map_err(db)?;
            }
        }

        for term in &set.terms {
            sqlx::query(
                r"
                INSERT INTO terms (id, study_set_id, word, definition, rank)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    word = excluded.word,
                    definition = excluded.definition,
                    rank = excluded.rank
                ",
            )
            .bind(to_i64("term_id", term.id.value())?)
            .bind(set_id)
            .bind(&term.word)
            .bind(&term.definition)
            .bind(i64::from(term.rank))
            .execute(&mut *tx)
            .await
            .map_err(db)?;
        }

        tx.commit().await.map_err(db)?;
        Ok(())
    }

    async fn get_study_set(&self, id: StudySetId) -> Result<Option<StudySet>, StorageError> {
        let set_id = to_i64("study_set_id", id.value())?;
        let Some(row) = sqlx::query(
            r"
            SELECT id, user_id, title, description, created_at, visibility
            FROM study_sets WHERE id = ?1
            ",
        )
        .bind(set_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?
        else {
            return Ok(None);
        };

        let term_rows = sqlx::query(
            r"
            SELECT id, study_set_id, word, definition, rank
            FROM terms
            WHERE study_set_id = ?1
            ORDER BY rank ASC, id ASC
            ",
        )
        .bind(set_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        let mut terms = Vec::with_capacity(term_rows.len());
        for row in &term_rows {
            terms.push(map_term_row(row)?);
        }

        let set = StudySet::new(
            study_set_id(&row, "id")?,
            user_id(&row, "user_id")?,
            row.try_get::<String, _>("title").map_err(ser)?,
            row.try_get::<String, _>("description").map_err(ser)?,
            row.try_get("created_at").map_err(ser)?,
            Visibility::parse(&row.try_get::<String, _>("visibility").map_err(ser)?)
                .map_err(ser)?,
            terms,
        )
        .map_err(ser)?;
        Ok(Some(set))
    }

    async fn list_sets_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<StudySetSummary>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT s.id, s.title, s.created_at, s.visibility, COUNT(t.id) AS term_count
            FROM study_sets s
            LEFT JOIN terms t ON t.study_set_id = s.id
            WHERE s.user_id = ?1
            GROUP BY s.id
            ORDER BY s.created_at DESC, s.id ASC
            ",
        )
        .bind(to_i64("user_id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.iter().map(map_study_set_summary_row).collect()
    }

    async fn term_study_set(&self, term_id: TermId) -> Result<Option<StudySetId>, StorageError> {
        let row = sqlx::query("SELECT study_set_id FROM terms WHERE id = ?1")
            .bind(to_i64("term_id", term_id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(db)?;
        row.map(|row| study_set_id(&row, "study_set_id")).transpose()
    }

    async fn set_starred(
        &self,
        user_id: UserId,
        term_id: TermId,
        starred: bool,
    ) -> Result<(), StorageError> {
        let user = to_i64("user_id", user_id.value())?;
        let term = to_i64("term_id", term_id.value())?;

        let exists = sqlx::query("SELECT 1 FROM terms WHERE id = ?1")
            .bind(term)
            .fetch_optional(&self.pool)
            .await
            .map_err(db)?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        let sql = if starred {
            r"
            INSERT INTO starred_terms (user_id, term_id)
            VALUES (?1, ?2)
            ON CONFLICT(user_id, term_id) DO NOTHING
            "
        } else {
            "DELETE FROM starred_terms WHERE user_id = ?1 AND term_id = ?2"
        };
        sqlx::query(sql)
            .bind(user)
            .bind(term)
            .execute(&self.pool)
            .await
            .map_err(db)?;
        Ok(())
    }

    async fn list_starred(
        &self,
        user_id: UserId,
        study_set_id: StudySetId,
    ) -> Result<Vec<TermId>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT st.term_id
            FROM starred_terms st
            JOIN terms t ON t.id = st.term_id
            WHERE st.user_id = ?1 AND t.study_set_id = ?2
            ORDER BY t.rank ASC, t.id ASC
            ",
        )
        .bind(to_i64("user_id", user_id.value())?)
        .bind(to_i64("study_set_id", study_set_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.iter().map(|row| term_id(row, "term_id")).collect()
    }
}
