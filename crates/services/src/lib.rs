#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod error;
pub mod learn;
pub mod metrics;
pub mod profile;

pub use study_core::Clock;

pub use api::{ApiClient, ApiConfig, USER_ID_HEADER};
pub use app_services::{AppServices, StudyClient};
pub use error::{
    AppServicesError, EffectError, LearnServiceError, MetricsError, ProfileLookupError,
    RemoteError,
};
pub use learn::{LearnController, LearnMaterial, LearnService, LearnSnapshot};
pub use metrics::{MetricsConfig, MetricsRegistry};
pub use profile::{HydrationState, ProfileHydrator};
