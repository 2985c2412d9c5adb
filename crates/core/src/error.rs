use thiserror::Error;

use crate::learn::LearnError;
use crate::model::{FolderError, StudySetError, TermError, UsernameError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Username(#[from] UsernameError),
    #[error(transparent)]
    Term(#[from] TermError),
    #[error(transparent)]
    StudySet(#[from] StudySetError),
    #[error(transparent)]
    Folder(#[from] FolderError),
    #[error(transparent)]
    Learn(#[from] LearnError),
}
