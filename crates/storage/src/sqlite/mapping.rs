use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use study_core::model::{
    FolderId, FolderSummary, StudySetExperience, StudySetId, StudySetSummary, Term, TermId, User,
    UserId, Username, Visibility,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Map driver errors, keeping constraint violations distinguishable.
pub(crate) fn db(e: sqlx::Error) -> StorageError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return StorageError::Conflict;
        }
        if db_err.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
    }
    StorageError::Connection(e.to_string())
}

pub(crate) fn to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn user_id(row: &SqliteRow, column: &'static str) -> Result<UserId, StorageError> {
    Ok(UserId::new(to_u64(column, row.try_get(column).map_err(ser)?)?))
}

pub(crate) fn study_set_id(
    row: &SqliteRow,
    column: &'static str,
) -> Result<StudySetId, StorageError> {
    Ok(StudySetId::new(to_u64(column, row.try_get(column).map_err(ser)?)?))
}

pub(crate) fn term_id(row: &SqliteRow, column: &'static str) -> Result<TermId, StorageError> {
    Ok(TermId::new(to_u64(column, row.try_get(column).map_err(ser)?)?))
}

pub(crate) fn folder_id(row: &SqliteRow, column: &'static str) -> Result<FolderId, StorageError> {
    Ok(FolderId::new(to_u64(column, row.try_get(column).map_err(ser)?)?))
}

pub(crate) fn count(row: &SqliteRow, column: &'static str) -> Result<u32, StorageError> {
    to_u32(column, row.try_get(column).map_err(ser)?)
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<User, StorageError> {
    Ok(User {
        id: user_id(row, "id")?,
        username: Username::new(row.try_get::<String, _>("username").map_err(ser)?)
            .map_err(ser)?,
        name: row.try_get("name").map_err(ser)?,
        image: row.try_get("image").map_err(ser)?,
        verified: row.try_get::<i64, _>("verified").map_err(ser)? != 0,
        last_seen_at: row.try_get("last_seen_at").map_err(ser)?,
    })
}

pub(crate) fn map_term_row(row: &SqliteRow) -> Result<Term, StorageError> {
    Term::new(
        term_id(row, "id")?,
        study_set_id(row, "study_set_id")?,
        row.try_get::<String, _>("word").map_err(ser)?,
        row.try_get::<String, _>("definition").map_err(ser)?,
        count(row, "rank")?,
    )
    .map_err(ser)
}

pub(crate) fn map_study_set_summary_row(row: &SqliteRow) -> Result<StudySetSummary, StorageError> {
    Ok(StudySetSummary {
        id: study_set_id(row, "id")?,
        title: row.try_get("title").map_err(ser)?,
        term_count: count(row, "term_count")?,
        created_at: row.try_get("created_at").map_err(ser)?,
        visibility: Visibility::parse(&row.try_get::<String, _>("visibility").map_err(ser)?)
            .map_err(ser)?,
    })
}

pub(crate) fn map_folder_summary_row(row: &SqliteRow) -> Result<FolderSummary, StorageError> {
    Ok(FolderSummary {
        id: folder_id(row, "id")?,
        title: row.try_get("title").map_err(ser)?,
        slug: row.try_get("slug").map_err(ser)?,
        study_set_count: count(row, "study_set_count")?,
    })
}

pub(crate) fn map_experience_row(row: &SqliteRow) -> Result<StudySetExperience, StorageError> {
    Ok(StudySetExperience {
        user_id: user_id(row, "user_id")?,
        study_set_id: study_set_id(row, "study_set_id")?,
        rounds_completed: count(row, "rounds_completed")?,
        last_round_at: row.try_get("last_round_at").map_err(ser)?,
    })
}
