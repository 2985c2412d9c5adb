use std::sync::Arc;

use storage::repository::Storage;
use study_core::model::UserId;
use tokio::runtime::Handle;

use crate::Clock;
use crate::api::ApiClient;
use crate::error::AppServicesError;
use crate::learn::{
    CreatorOnly, EditCapability, EffectRunner, HttpRoundNotifier, HttpStarWriter,
    HttpStudySetSource, LearnService, StorageRoundNotifier, StorageStarWriter,
    StorageStudySetSource, StudySetSource,
};
use crate::metrics::{MetricsConfig, MetricsRegistry};
use crate::profile::{HttpProfileSource, ProfileHydrator, ProfileSource, StorageProfileSource};

/// Storage-backed services, assembled once by the composition root.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    clock: Clock,
    metrics: Arc<MetricsRegistry>,
    profiles: Arc<dyn ProfileSource>,
    study_sets: Arc<dyn StudySetSource>,
}

impl AppServices {
    /// Wire services over an existing `Storage`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the metrics registry cannot be built.
    pub fn new(
        storage: Storage,
        clock: Clock,
        metrics: &MetricsConfig,
    ) -> Result<Self, AppServicesError> {
        let metrics = Arc::new(MetricsRegistry::new(
            metrics,
            Arc::clone(&storage.stats),
            clock,
        )?);
        let profiles: Arc<dyn ProfileSource> = Arc::new(StorageProfileSource::new(
            Arc::clone(&storage.users),
            Arc::clone(&storage.study_sets),
            Arc::clone(&storage.folders),
        ));
        let study_sets: Arc<dyn StudySetSource> =
            Arc::new(StorageStudySetSource::new(Arc::clone(&storage.study_sets)));

        Ok(Self {
            storage,
            clock,
            metrics,
            profiles,
            study_sets,
        })
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        metrics: &MetricsConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::new(storage, clock, metrics)
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn metrics(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.metrics)
    }

    #[must_use]
    pub fn profile_source(&self) -> Arc<dyn ProfileSource> {
        Arc::clone(&self.profiles)
    }

    #[must_use]
    pub fn study_set_source(&self) -> Arc<dyn StudySetSource> {
        Arc::clone(&self.study_sets)
    }

    /// Services for a client that talks to storage directly.
    #[must_use]
    pub fn study_client(&self, current_user: Option<UserId>, runtime: Handle) -> StudyClient {
        let mut runner = EffectRunner::new(runtime);
        if let Some(user_id) = current_user {
            runner = runner
                .with_notifier(Arc::new(StorageRoundNotifier::new(
                    user_id,
                    Arc::clone(&self.storage.experiences),
                    self.clock,
                )))
                .with_star_writer(Arc::new(StorageStarWriter::new(
                    user_id,
                    Arc::clone(&self.storage.study_sets),
                )));
        }

        StudyClient {
            learn: LearnService::new(self.study_set_source(), runner),
            profiles: ProfileHydrator::new(self.profile_source()),
            capability: Arc::new(CreatorOnly),
            current_user,
        }
    }
}

/// What a learning client needs, whether it reads storage or the HTTP API.
#[derive(Clone)]
pub struct StudyClient {
    learn: LearnService,
    profiles: ProfileHydrator,
    capability: Arc<dyn EditCapability>,
    current_user: Option<UserId>,
}

impl StudyClient {
    #[must_use]
    pub fn new(
        learn: LearnService,
        profiles: ProfileHydrator,
        capability: Arc<dyn EditCapability>,
        current_user: Option<UserId>,
    ) -> Self {
        Self {
            learn,
            profiles,
            capability,
            current_user,
        }
    }

    /// Services for a client backed by the HTTP API.
    #[must_use]
    pub fn remote(api: ApiClient, runtime: Handle) -> Self {
        let current_user = api.user_id();
        let mut runner = EffectRunner::new(runtime);
        if current_user.is_some() {
            runner = runner
                .with_notifier(Arc::new(HttpRoundNotifier::new(api.clone())))
                .with_star_writer(Arc::new(HttpStarWriter::new(api.clone())));
        }

        Self {
            learn: LearnService::new(Arc::new(HttpStudySetSource::new(api.clone())), runner),
            profiles: ProfileHydrator::new(Arc::new(HttpProfileSource::new(api))),
            capability: Arc::new(CreatorOnly),
            current_user,
        }
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.learn = self.learn.with_shuffle(shuffle);
        self
    }

    #[must_use]
    pub fn learn(&self) -> &LearnService {
        &self.learn
    }

    #[must_use]
    pub fn profiles(&self) -> &ProfileHydrator {
        &self.profiles
    }

    #[must_use]
    pub fn capability(&self) -> Arc<dyn EditCapability> {
        Arc::clone(&self.capability)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserId> {
        self.current_user
    }
}
