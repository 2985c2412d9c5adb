use std::sync::Arc;

use async_trait::async_trait;
use storage::repository::{ExperienceRepository, StudySetRepository};
use study_core::Clock;
use study_core::learn::LearnEffect;
use study_core::model::{StudySetId, TermId, UserId};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::error::EffectError;

//
// ─── COLLABORATORS ─────────────────────────────────────────────────────────────
//

/// Tells the progress tracker that a round of a study set finished.
///
/// One call per request: implementations neither deduplicate nor retry.
#[async_trait]
pub trait RoundCompletionNotifier: Send + Sync {
    /// # Errors
    ///
    /// Returns `EffectError` when the progress tracker cannot be reached.
    async fn complete_round(&self, study_set_id: StudySetId) -> Result<(), EffectError>;
}

/// Persists star toggles.
#[async_trait]
pub trait StarWriter: Send + Sync {
    /// # Errors
    ///
    /// Returns `EffectError` when the write fails.
    async fn set_starred(&self, term_id: TermId, starred: bool) -> Result<(), EffectError>;
}

/// Receives effect failures; the study flow itself never sees them.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, effect: &LearnEffect, error: &EffectError);
}

/// Advances the user's `StudySetExperience` row directly in storage.
#[derive(Clone)]
pub struct StorageRoundNotifier {
    user_id: UserId,
    experiences: Arc<dyn ExperienceRepository>,
    clock: Clock,
}

impl StorageRoundNotifier {
    #[must_use]
    pub fn new(user_id: UserId, experiences: Arc<dyn ExperienceRepository>, clock: Clock) -> Self {
        Self {
            user_id,
            experiences,
            clock,
        }
    }
}

#[async_trait]
impl RoundCompletionNotifier for StorageRoundNotifier {
    async fn complete_round(&self, study_set_id: StudySetId) -> Result<(), EffectError> {
        let experience = self
            .experiences
            .complete_round(self.user_id, study_set_id, self.clock.now())
            .await?;
        tracing::debug!(
            study_set = %study_set_id,
            rounds = experience.rounds_completed,
            "round recorded"
        );
        Ok(())
    }
}

/// Posts to the server's complete-round route.
#[derive(Clone)]
pub struct HttpRoundNotifier {
    api: ApiClient,
}

impl HttpRoundNotifier {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RoundCompletionNotifier for HttpRoundNotifier {
    async fn complete_round(&self, study_set_id: StudySetId) -> Result<(), EffectError> {
        self.api.complete_round(study_set_id).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct StorageStarWriter {
    user_id: UserId,
    study_sets: Arc<dyn StudySetRepository>,
}

impl StorageStarWriter {
    #[must_use]
    pub fn new(user_id: UserId, study_sets: Arc<dyn StudySetRepository>) -> Self {
        Self {
            user_id,
            study_sets,
        }
    }
}

#[async_trait]
impl StarWriter for StorageStarWriter {
    async fn set_starred(&self, term_id: TermId, starred: bool) -> Result<(), EffectError> {
        self.study_sets
            .set_starred(self.user_id, term_id, starred)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct HttpStarWriter {
    api: ApiClient,
}

impl HttpStarWriter {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl StarWriter for HttpStarWriter {
    async fn set_starred(&self, term_id: TermId, starred: bool) -> Result<(), EffectError> {
        self.api.set_starred(term_id, starred).await?;
        Ok(())
    }
}

//
// ─── RUNNER ────────────────────────────────────────────────────────────────────
//

/// Executes learn effects on the runtime, outside the state machine.
///
/// Without a signed-in user there is nobody to record progress for, so the
/// collaborators are optional and missing ones turn effects into no-ops.
#[derive(Clone)]
pub struct EffectRunner {
    runtime: Handle,
    notifier: Option<Arc<dyn RoundCompletionNotifier>>,
    stars: Option<Arc<dyn StarWriter>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

impl EffectRunner {
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            notifier: None,
            stars: None,
            reporter: None,
        }
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn RoundCompletionNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn with_star_writer(mut self, stars: Arc<dyn StarWriter>) -> Self {
        self.stars = Some(stars);
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Spawn one task per effect and return immediately.
    ///
    /// The handles are only useful to tests; callers may drop them.
    pub fn run(&self, effects: Vec<LearnEffect>) -> Vec<JoinHandle<()>> {
        effects
            .into_iter()
            .filter_map(|effect| self.spawn(effect))
            .collect()
    }

    fn spawn(&self, effect: LearnEffect) -> Option<JoinHandle<()>> {
        match effect {
            LearnEffect::CompleteRound { study_set_id, .. } => {
                let Some(notifier) = self.notifier.clone() else {
                    tracing::debug!(?effect, "no round notifier; skipping");
                    return None;
                };
                let reporter = self.reporter.clone();
                Some(self.runtime.spawn(async move {
                    let result = notifier.complete_round(study_set_id).await;
                    settle(&effect, result, reporter.as_deref());
                }))
            }
            LearnEffect::SetStarred { term_id, starred } => {
                let Some(stars) = self.stars.clone() else {
                    tracing::debug!(?effect, "no star writer; skipping");
                    return None;
                };
                let reporter = self.reporter.clone();
                Some(self.runtime.spawn(async move {
                    let result = stars.set_starred(term_id, starred).await;
                    settle(&effect, result, reporter.as_deref());
                }))
            }
        }
    }
}

fn settle(
    effect: &LearnEffect,
    result: Result<(), EffectError>,
    reporter: Option<&dyn ErrorReporter>,
) {
    if let Err(err) = result {
        tracing::warn!(?effect, error = %err, "learn effect failed");
        if let Some(reporter) = reporter {
            reporter.report(effect, &err);
        }
    }
}
