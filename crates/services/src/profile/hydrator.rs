use std::sync::Arc;

use study_core::model::{ProfileData, UserId, Username};

use super::source::ProfileSource;
use crate::error::ProfileLookupError;

/// Resolution of a profile route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationState {
    /// No username (or an empty one) yet; nothing was fetched.
    Loading,
    NotFound,
    Ready(ProfileData),
    /// The lookup failed for a reason other than a missing user.
    Failed(String),
}

impl HydrationState {
    #[must_use]
    pub fn profile(&self) -> Option<&ProfileData> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// Turns a route username into a hydrated profile.
#[derive(Clone)]
pub struct ProfileHydrator {
    source: Arc<dyn ProfileSource>,
}

impl ProfileHydrator {
    #[must_use]
    pub fn new(source: Arc<dyn ProfileSource>) -> Self {
        Self { source }
    }

    /// Resolve the profile for `route_username` as seen by `current_user`.
    ///
    /// `is_me` is fixed here and not recomputed if the signed-in user changes later.
    pub async fn hydrate(
        &self,
        route_username: Option<&str>,
        current_user: Option<UserId>,
    ) -> HydrationState {
        let Some(raw) = route_username.filter(|raw| !raw.is_empty()) else {
            return HydrationState::Loading;
        };

        // A handle that cannot be valid cannot belong to anyone.
        let Ok(username) = Username::from_route(raw) else {
            tracing::debug!(route = raw, "invalid username in route");
            return HydrationState::NotFound;
        };

        match self.source.profile(&username, current_user).await {
            Ok(profile) => HydrationState::Ready(ProfileData::resolve(profile, current_user)),
            Err(ProfileLookupError::NotFound) => HydrationState::NotFound,
            Err(err) => {
                tracing::warn!(%username, error = %err, "profile lookup failed");
                HydrationState::Failed(err.to_string())
            }
        }
    }
}
