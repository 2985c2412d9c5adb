use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{StudySetId, Term, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StudySetError {
    #[error("study set title cannot be empty")]
    EmptyTitle,

    #[error("term {term:?} belongs to another study set")]
    ForeignTerm { term: crate::model::TermId },

    #[error("invalid visibility: {0}")]
    InvalidVisibility(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
}

impl Visibility {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
        }
    }

    /// Parse the persisted representation.
    ///
    /// # Errors
    ///
    /// Returns `StudySetError::InvalidVisibility` for unknown values.
    pub fn parse(s: &str) -> Result<Self, StudySetError> {
        match s {
            "public" => Ok(Visibility::Public),
            "unlisted" => Ok(Visibility::Unlisted),
            "private" => Ok(Visibility::Private),
            other => Err(StudySetError::InvalidVisibility(other.to_owned())),
        }
    }
}

/// A study set with its terms ordered by rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySet {
    pub id: StudySetId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub visibility: Visibility,
    pub terms: Vec<Term>,
}

impl StudySet {
    /// Build a study set, sorting terms by rank.
    ///
    /// # Errors
    ///
    /// Returns `StudySetError` if the title is blank or a term points at a different set.
    pub fn new(
        id: StudySetId,
        user_id: UserId,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
        visibility: Visibility,
        mut terms: Vec<Term>,
    ) -> Result<Self, StudySetError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(StudySetError::EmptyTitle);
        }
        if let Some(foreign) = terms.iter().find(|t| t.study_set_id != id) {
            return Err(StudySetError::ForeignTerm { term: foreign.id });
        }
        terms.sort_by_key(|t| (t.rank, t.id));

        Ok(Self {
            id,
            user_id,
            title,
            description: description.into(),
            created_at,
            visibility,
            terms,
        })
    }

    /// Private sets are only visible to their creator.
    #[must_use]
    pub fn is_visible_to(&self, viewer: Option<UserId>) -> bool {
        self.visibility != Visibility::Private || viewer == Some(self.user_id)
    }

    #[must_use]
    pub fn summary(&self) -> StudySetSummary {
        StudySetSummary {
            id: self.id,
            title: self.title.clone(),
            term_count: u32::try_from(self.terms.len()).unwrap_or(u32::MAX),
            created_at: self.created_at,
            visibility: self.visibility,
        }
    }
}

/// List shape used by profile pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySetSummary {
    pub id: StudySetId,
    pub title: String,
    pub term_count: u32,
    pub created_at: DateTime<Utc>,
    pub visibility: Visibility,
}

/// Per-user progress through a study set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySetExperience {
    pub user_id: UserId,
    pub study_set_id: StudySetId,
    pub rounds_completed: u32,
    pub last_round_at: Option<DateTime<Utc>>,
}

impl StudySetExperience {
    #[must_use]
    pub fn new(user_id: UserId, study_set_id: StudySetId) -> Self {
        Self {
            user_id,
            study_set_id,
            rounds_completed: 0,
            last_round_at: None,
        }
    }

    /// Record one finished round.
    pub fn complete_round(&mut self, at: DateTime<Utc>) {
        self.rounds_completed = self.rounds_completed.saturating_add(1);
        self.last_round_at = Some(at);
    }
}
