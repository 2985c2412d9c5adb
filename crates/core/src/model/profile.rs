use serde::{Deserialize, Serialize};

use crate::model::{FolderSummary, StudySetSummary, UserId, Username, Visibility};

/// Public view of a user, with the sets and folders shown on their profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub username: Username,
    pub image: Option<String>,
    pub verified: bool,
    pub name: Option<String>,
    pub study_sets: Vec<StudySetSummary>,
    pub folders: Vec<FolderSummary>,
}

impl Profile {
    /// Drop sets the viewer is not allowed to see.
    ///
    /// Owners see everything; everyone else only sees public sets.
    #[must_use]
    pub fn visible_to(mut self, viewer: Option<UserId>) -> Self {
        if viewer != Some(self.id) {
            self.study_sets
                .retain(|set| set.visibility == Visibility::Public);
        }
        self
    }
}

/// A hydrated profile plus whether it belongs to the current user.
///
/// `is_me` is fixed when the profile is resolved and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileData {
    pub profile: Profile,
    pub is_me: bool,
}

impl ProfileData {
    #[must_use]
    pub fn resolve(profile: Profile, current_user: Option<UserId>) -> Self {
        let is_me = current_user == Some(profile.id);
        Self { profile, is_me }
    }
}
