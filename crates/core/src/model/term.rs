use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{StudySetId, TermId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TermError {
    #[error("term {0:?} has neither a word nor a definition")]
    Blank(TermId),
}

/// A single word/definition pair belonging to a study set.
///
/// Terms are read-only while a study session is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub study_set_id: StudySetId,
    pub word: String,
    pub definition: String,
    pub rank: u32,
}

impl Term {
    /// Build a term, allowing one side to be blank.
    ///
    /// # Errors
    ///
    /// Returns `TermError::Blank` when both sides are empty after trimming.
    pub fn new(
        id: TermId,
        study_set_id: StudySetId,
        word: impl Into<String>,
        definition: impl Into<String>,
        rank: u32,
    ) -> Result<Self, TermError> {
        let word = word.into();
        let definition = definition.into();
        if word.trim().is_empty() && definition.trim().is_empty() {
            return Err(TermError::Blank(id));
        }
        Ok(Self {
            id,
            study_set_id,
            word,
            definition,
            rank,
        })
    }
}
