use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use study_core::model::{StudySetId, TermId, UserId, Username};

use crate::error::RemoteError;

/// Header carrying the authenticated user id between client and server.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_id: Option<UserId>,
}

/// Thin JSON client for the study API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

#[derive(Debug, Serialize)]
struct StarBody {
    starred: bool,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.config.user_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.user_id {
            Some(id) => request.header(USER_ID_HEADER, id.to_string()),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let response = self
            .authed(self.client.get(self.url(path)))
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound),
            status if !status.is_success() => Err(RemoteError::HttpStatus(status)),
            _ => Ok(response.json().await?),
        }
    }

    async fn expect_empty(&self, request: RequestBuilder) -> Result<(), RemoteError> {
        let response = self.authed(request).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound),
            status if !status.is_success() => Err(RemoteError::HttpStatus(status)),
            _ => Ok(()),
        }
    }

    /// Fetch a profile by username.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` on 404 and other `RemoteError`s on failure.
    pub async fn profile<T: DeserializeOwned>(
        &self,
        username: &Username,
    ) -> Result<T, RemoteError> {
        self.get_json(&format!("/api/profiles/{}", username.as_str()))
            .await
    }

    /// Fetch a study set with the caller's starred terms.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` on 404 and other `RemoteError`s on failure.
    pub async fn study_set<T: DeserializeOwned>(&self, id: StudySetId) -> Result<T, RemoteError> {
        self.get_json(&format!("/api/study-sets/{id}")).await
    }

    /// Report a finished round.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` when the request fails or is rejected.
    pub async fn complete_round(&self, id: StudySetId) -> Result<(), RemoteError> {
        let url = self.url(&format!("/api/study-sets/{id}/complete-round"));
        self.expect_empty(self.client.post(url)).await
    }

    /// Star or unstar a term.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` when the request fails or is rejected.
    pub async fn set_starred(&self, term_id: TermId, starred: bool) -> Result<(), RemoteError> {
        let url = self.url(&format!("/api/terms/{term_id}/star"));
        self.expect_empty(self.client.put(url).json(&StarBody { starred }))
            .await
    }
}
