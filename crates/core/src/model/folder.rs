use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{FolderId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FolderError {
    #[error("folder title cannot be empty")]
    EmptyTitle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub user_id: UserId,
    pub title: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl Folder {
    /// Build a folder; the slug is derived from the title.
    ///
    /// # Errors
    ///
    /// Returns `FolderError::EmptyTitle` if the title is blank.
    pub fn new(
        id: FolderId,
        user_id: UserId,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FolderError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(FolderError::EmptyTitle);
        }
        let slug = slugify(&title);
        Ok(Self {
            id,
            user_id,
            title,
            slug,
            created_at,
        })
    }
}

/// List shape used by profile pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSummary {
    pub id: FolderId,
    pub title: String,
    pub slug: String,
    pub study_set_count: u32,
}

fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}
