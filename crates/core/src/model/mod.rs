mod folder;
mod ids;
mod profile;
mod study_set;
mod term;
mod user;

pub use folder::{Folder, FolderError, FolderSummary};
pub use ids::{FolderId, ParseIdError, StudySetId, TermId, UserId};
pub use profile::{Profile, ProfileData};
pub use study_set::{StudySet, StudySetError, StudySetExperience, StudySetSummary, Visibility};
pub use term::{Term, TermError};
pub use user::{USERNAME_MARKER, User, Username, UsernameError};
