use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::UserId;

/// Marker placed in front of usernames in profile routes (`/@alice`).
pub const USERNAME_MARKER: char = '@';

const MAX_USERNAME_LEN: usize = 40;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UsernameError {
    #[error("username is empty")]
    Empty,

    #[error("username is too long: {len} > {max}")]
    TooLong { len: usize, max: usize },

    #[error("username contains an invalid character: {0:?}")]
    InvalidChar(char),
}

/// A validated user handle, stored without the route marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate a bare username.
    ///
    /// # Errors
    ///
    /// Returns `UsernameError` when the value is empty, too long, or contains
    /// characters outside `[A-Za-z0-9_-]`.
    pub fn new(raw: impl Into<String>) -> Result<Self, UsernameError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UsernameError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_USERNAME_LEN {
            return Err(UsernameError::TooLong {
                len,
                max: MAX_USERNAME_LEN,
            });
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(UsernameError::InvalidChar(bad));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parse a username taken from a route segment, dropping one leading marker.
    ///
    /// # Errors
    ///
    /// Same as [`Username::new`] once the marker is removed.
    pub fn from_route(segment: &str) -> Result<Self, UsernameError> {
        let bare = segment.strip_prefix(USERNAME_MARKER).unwrap_or(segment);
        Self::new(bare)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Route form of the username, e.g. `@alice`.
    #[must_use]
    pub fn to_route(&self) -> String {
        format!("{USERNAME_MARKER}{}", self.0)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Account record as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub name: Option<String>,
    pub image: Option<String>,
    pub verified: bool,
    pub last_seen_at: DateTime<Utc>,
}
