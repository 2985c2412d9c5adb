use study_core::model::{FolderSummary, ProfileData, StudySetId, StudySetSummary};

use crate::vm::time_fmt::{format_date, plural};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudySetRowVm {
    pub id: StudySetId,
    pub title: String,
    pub term_count: String,
    pub created: String,
}

impl From<&StudySetSummary> for StudySetRowVm {
    fn from(set: &StudySetSummary) -> Self {
        Self {
            id: set.id,
            title: set.title.clone(),
            term_count: plural(set.term_count, "term", "terms"),
            created: format_date(set.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderRowVm {
    pub title: String,
    pub slug: String,
    pub set_count: String,
}

impl From<&FolderSummary> for FolderRowVm {
    fn from(folder: &FolderSummary) -> Self {
        Self {
            title: folder.title.clone(),
            slug: folder.slug.clone(),
            set_count: plural(folder.study_set_count, "set", "sets"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileVm {
    pub display_name: String,
    pub handle: String,
    pub image: Option<String>,
    pub verified: bool,
    pub is_me: bool,
    pub study_sets: Vec<StudySetRowVm>,
    pub folders: Vec<FolderRowVm>,
}

impl From<&ProfileData> for ProfileVm {
    fn from(data: &ProfileData) -> Self {
        let profile = &data.profile;
        let display_name = profile
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map_or_else(|| profile.username.to_string(), str::to_owned);

        Self {
            display_name,
            handle: profile.username.to_route(),
            image: profile.image.clone(),
            verified: profile.verified,
            is_me: data.is_me,
            study_sets: profile.study_sets.iter().map(StudySetRowVm::from).collect(),
            folders: profile.folders.iter().map(FolderRowVm::from).collect(),
        }
    }
}

impl ProfileVm {
    #[must_use]
    pub fn sets_heading(&self) -> &'static str {
        if self.is_me { "Your study sets" } else { "Study sets" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::{FolderId, Profile, UserId, Username, Visibility};
    use study_core::time::fixed_now;

    fn data(name: Option<&str>, is_me: bool) -> ProfileData {
        ProfileData {
            profile: Profile {
                id: UserId::new(1),
                username: Username::new("alice").unwrap(),
                image: None,
                verified: true,
                name: name.map(str::to_owned),
                study_sets: vec![StudySetSummary {
                    id: StudySetId::new(3),
                    title: "Verbs".into(),
                    term_count: 1,
                    created_at: fixed_now(),
                    visibility: Visibility::Public,
                }],
                folders: vec![FolderSummary {
                    id: FolderId::new(2),
                    title: "German".into(),
                    slug: "german".into(),
                    study_set_count: 4,
                }],
            },
            is_me,
        }
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(ProfileVm::from(&data(Some("Alice A."), false)).display_name, "Alice A.");
        assert_eq!(ProfileVm::from(&data(Some("  "), false)).display_name, "alice");
        assert_eq!(ProfileVm::from(&data(None, false)).display_name, "alice");
    }

    #[test]
    fn rows_carry_counts_and_dates() {
        let vm = ProfileVm::from(&data(None, false));
        assert_eq!(vm.handle, "@alice");
        assert_eq!(vm.study_sets[0].term_count, "1 term");
        assert_eq!(vm.study_sets[0].created, "Nov 14, 2023");
        assert_eq!(vm.folders[0].set_count, "4 sets");
    }

    #[test]
    fn heading_depends_on_ownership() {
        assert_eq!(ProfileVm::from(&data(None, true)).sets_heading(), "Your study sets");
        assert_eq!(ProfileVm::from(&data(None, false)).sets_heading(), "Study sets");
    }
}
