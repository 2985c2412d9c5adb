use std::sync::Arc;

use services::learn::EditCapability;
use services::{LearnService, ProfileHydrator, StudyClient};
use study_core::model::{StudySetId, TermId, UserId};

pub trait UiApp: Send + Sync {
    fn app_name(&self) -> &str;
    fn study_client(&self) -> StudyClient;

    /// Set opened from the home page, if any.
    fn default_study_set(&self) -> Option<StudySetId>;

    /// Hand an edit request to whatever owns the editor.
    fn request_edit(&self, study_set_id: StudySetId, term_id: TermId);
}

#[derive(Clone)]
pub struct AppContext {
    app: Arc<dyn UiApp>,
    client: StudyClient,
    default_study_set: Option<StudySetId>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            app: Arc::clone(app),
            client: app.study_client(),
            default_study_set: app.default_study_set(),
        }
    }

    #[must_use]
    pub fn app(&self) -> &Arc<dyn UiApp> {
        &self.app
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserId> {
        self.client.current_user()
    }

    #[must_use]
    pub fn default_study_set(&self) -> Option<StudySetId> {
        self.default_study_set
    }

    #[must_use]
    pub fn learn(&self) -> LearnService {
        self.client.learn().clone()
    }

    #[must_use]
    pub fn profiles(&self) -> ProfileHydrator {
        self.client.profiles().clone()
    }

    #[must_use]
    pub fn capability(&self) -> Arc<dyn EditCapability> {
        self.client.capability()
    }

    pub fn request_edit(&self, study_set_id: StudySetId, term_id: TermId) {
        self.app.request_edit(study_set_id, term_id);
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
