use std::sync::Arc;

use async_trait::async_trait;
use storage::repository::{FolderRepository, StudySetRepository, UserRepository};
use study_core::model::{Profile, UserId, Username};

use crate::api::ApiClient;
use crate::error::ProfileLookupError;

/// Looks up public profiles by username.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch the profile as `viewer` may see it.
    ///
    /// # Errors
    ///
    /// Returns `ProfileLookupError::NotFound` for unknown usernames and
    /// `ProfileLookupError::Unavailable` for everything else.
    async fn profile(
        &self,
        username: &Username,
        viewer: Option<UserId>,
    ) -> Result<Profile, ProfileLookupError>;
}

#[derive(Clone)]
pub struct StorageProfileSource {
    users: Arc<dyn UserRepository>,
    study_sets: Arc<dyn StudySetRepository>,
    folders: Arc<dyn FolderRepository>,
}

impl StorageProfileSource {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        study_sets: Arc<dyn StudySetRepository>,
        folders: Arc<dyn FolderRepository>,
    ) -> Self {
        Self {
            users,
            study_sets,
            folders,
        }
    }
}

#[async_trait]
impl ProfileSource for StorageProfileSource {
    async fn profile(
        &self,
        username: &Username,
        viewer: Option<UserId>,
    ) -> Result<Profile, ProfileLookupError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(ProfileLookupError::NotFound)?;

        let study_sets = self.study_sets.list_sets_by_user(user.id).await?;
        let folders = self.folders.list_folders_by_user(user.id).await?;

        let profile = Profile {
            id: user.id,
            username: user.username,
            image: user.image,
            verified: user.verified,
            name: user.name,
            study_sets,
            folders,
        };
        Ok(profile.visible_to(viewer))
    }
}

/// Reads profiles from the HTTP API; a 404 maps to `NotFound`.
#[derive(Clone)]
pub struct HttpProfileSource {
    api: ApiClient,
}

impl HttpProfileSource {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ProfileSource for HttpProfileSource {
    async fn profile(
        &self,
        username: &Username,
        _viewer: Option<UserId>,
    ) -> Result<Profile, ProfileLookupError> {
        Ok(self.api.profile(username).await?)
    }
}
