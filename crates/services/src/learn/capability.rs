use study_core::model::{StudySet, UserId};

/// Decides whether a viewer may edit a study set.
pub trait EditCapability: Send + Sync {
    fn can_edit(&self, viewer: Option<UserId>, set: &StudySet) -> bool;
}

/// Only the creator of a set may edit it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreatorOnly;

impl EditCapability for CreatorOnly {
    fn can_edit(&self, viewer: Option<UserId>, set: &StudySet) -> bool {
        viewer == Some(set.user_id)
    }
}
