//! Shared error types for the services crate.

use thiserror::Error;

use study_core::learn::LearnError;
use study_core::model::StudySetId;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the HTTP API client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    #[error("resource not found")]
    NotFound,
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors raised while executing a learn effect.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EffectError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Errors emitted by `LearnService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LearnServiceError {
    #[error("study set {0} not found")]
    NotFound(StudySetId),
    #[error(transparent)]
    Learn(#[from] LearnError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Outcome of a failed profile lookup.
///
/// `NotFound` is a normal answer and must stay distinguishable from transport failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProfileLookupError {
    #[error("profile not found")]
    NotFound,
    #[error("profile unavailable: {0}")]
    Unavailable(String),
}

impl From<StorageError> for ProfileLookupError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound,
            other => Self::Unavailable(other.to_string()),
        }
    }
}

impl From<RemoteError> for ProfileLookupError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound => Self::NotFound,
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// Errors emitted by the metrics registry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MetricsError {
    #[error(transparent)]
    Prometheus(#[from] prometheus::Error),
    #[error("metrics output is not valid UTF-8")]
    Encoding,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}
