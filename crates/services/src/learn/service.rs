use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use storage::repository::StudySetRepository;
use study_core::learn::StudySession;
use study_core::model::{StudySet, StudySetId, TermId, UserId};

use super::controller::LearnController;
use super::effects::EffectRunner;
use crate::api::ApiClient;
use crate::error::{LearnServiceError, RemoteError};

/// A study set plus the viewer's starred terms: everything a learn session starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnMaterial {
    pub set: StudySet,
    #[serde(default)]
    pub starred: Vec<TermId>,
}

/// Where study sets come from.
#[async_trait]
pub trait StudySetSource: Send + Sync {
    /// Load a set with terms ordered by rank, or `None` when it does not exist
    /// or is private to someone other than `viewer`.
    ///
    /// # Errors
    ///
    /// Returns `LearnServiceError` when the backend fails.
    async fn material(
        &self,
        id: StudySetId,
        viewer: Option<UserId>,
    ) -> Result<Option<LearnMaterial>, LearnServiceError>;
}

#[derive(Clone)]
pub struct StorageStudySetSource {
    study_sets: Arc<dyn StudySetRepository>,
}

impl StorageStudySetSource {
    #[must_use]
    pub fn new(study_sets: Arc<dyn StudySetRepository>) -> Self {
        Self { study_sets }
    }
}

#[async_trait]
impl StudySetSource for StorageStudySetSource {
    async fn material(
        &self,
        id: StudySetId,
        viewer: Option<UserId>,
    ) -> Result<Option<LearnMaterial>, LearnServiceError> {
        let Some(set) = self
            .study_sets
            .get_study_set(id)
            .await?
            .filter(|set| set.is_visible_to(viewer))
        else {
            return Ok(None);
        };
        let starred = match viewer {
            Some(user_id) => self.study_sets.list_starred(user_id, id).await?,
            None => Vec::new(),
        };
        Ok(Some(LearnMaterial { set, starred }))
    }
}

/// Reads study sets from the HTTP API; the viewer travels in the client config.
#[derive(Clone)]
pub struct HttpStudySetSource {
    api: ApiClient,
}

impl HttpStudySetSource {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl StudySetSource for HttpStudySetSource {
    async fn material(
        &self,
        id: StudySetId,
        _viewer: Option<UserId>,
    ) -> Result<Option<LearnMaterial>, LearnServiceError> {
        match self.api.study_set(id).await {
            Ok(material) => Ok(Some(material)),
            Err(RemoteError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Starts learn sessions over study sets.
#[derive(Clone)]
pub struct LearnService {
    source: Arc<dyn StudySetSource>,
    runner: EffectRunner,
    shuffle: bool,
}

impl LearnService {
    #[must_use]
    pub fn new(source: Arc<dyn StudySetSource>, runner: EffectRunner) -> Self {
        Self {
            source,
            runner,
            shuffle: false,
        }
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Load a set without starting a session.
    ///
    /// # Errors
    ///
    /// Returns `LearnServiceError::NotFound` for unknown sets.
    pub async fn load(
        &self,
        id: StudySetId,
        viewer: Option<UserId>,
    ) -> Result<LearnMaterial, LearnServiceError> {
        self.source
            .material(id, viewer)
            .await?
            .ok_or(LearnServiceError::NotFound(id))
    }

    /// Start a session at the first term of round 1.
    ///
    /// # Errors
    ///
    /// Returns `LearnServiceError::NotFound` for unknown sets and
    /// `LearnServiceError::Learn` when the set has no terms.
    pub async fn start(
        &self,
        id: StudySetId,
        viewer: Option<UserId>,
    ) -> Result<(StudySet, LearnController), LearnServiceError> {
        let LearnMaterial { set, starred } = self.load(id, viewer).await?;

        let mut terms = set.terms.clone();
        if self.shuffle {
            terms.shuffle(&mut rand::rng());
        }
        let session = StudySession::new(set.id, terms)?.with_starred(starred);
        tracing::debug!(
            study_set = %set.id,
            terms = session.term_count(),
            "learn session started"
        );

        Ok((set, LearnController::new(session, self.runner.clone())))
    }
}
