use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use study_core::model::{
    Folder, FolderId, FolderSummary, StudySet, StudySetExperience, StudySetId, StudySetSummary,
    TermId, User, UserId, Username,
};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist or update a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken by another user.
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Fetch a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// Fetch a user by username (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, StorageError>;

    /// Record that the user was active at `at`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown users.
    async fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> Result<(), StorageError>;
}

#[async_trait]
pub trait StudySetRepository: Send + Sync {
    /// Persist a study set, replacing its terms.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the set cannot be stored.
    async fn upsert_study_set(&self, set: &StudySet) -> Result<(), StorageError>;

    /// Fetch a study set with its terms ordered by rank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_study_set(&self, id: StudySetId) -> Result<Option<StudySet>, StorageError>;

    /// List a user's study sets, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_sets_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<StudySetSummary>, StorageError>;

    /// The study set a term belongs to, or `None` for unknown terms.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn term_study_set(&self, term_id: TermId) -> Result<Option<StudySetId>, StorageError>;

    /// Star or unstar a term for a user. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the term does not exist.
    async fn set_starred(
        &self,
        user_id: UserId,
        term_id: TermId,
        starred: bool,
    ) -> Result<(), StorageError>;

    /// Starred term IDs of a user within one study set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_starred(
        &self,
        user_id: UserId,
        study_set_id: StudySetId,
    ) -> Result<Vec<TermId>, StorageError>;
}

#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// Persist or update a folder.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the folder cannot be stored.
    async fn upsert_folder(&self, folder: &Folder) -> Result<(), StorageError>;

    /// Put a study set into a folder. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if either side is missing.
    async fn add_study_set(
        &self,
        folder_id: FolderId,
        study_set_id: StudySetId,
    ) -> Result<(), StorageError>;

    /// List a user's folders with the number of sets in each.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_folders_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FolderSummary>, StorageError>;
}

#[async_trait]
pub trait ExperienceRepository: Send + Sync {
    /// Count one finished learn round, creating the experience on first use.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the study set does not exist.
    async fn complete_round(
        &self,
        user_id: UserId,
        study_set_id: StudySetId,
        at: DateTime<Utc>,
    ) -> Result<StudySetExperience, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_experience(
        &self,
        user_id: UserId,
        study_set_id: StudySetId,
    ) -> Result<Option<StudySetExperience>, StorageError>;

    /// Record that a user opened a folder.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the folder does not exist.
    async fn record_folder_visit(
        &self,
        user_id: UserId,
        folder_id: FolderId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Record that a term was studied in a given round.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the term does not exist.
    async fn record_studiable_term(
        &self,
        user_id: UserId,
        term_id: TermId,
        round: u32,
    ) -> Result<(), StorageError>;
}

/// Tables the metrics registry counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountedTable {
    Users,
    StudySets,
    Folders,
    Terms,
    StudySetExperiences,
    FolderExperiences,
    StudiableTerms,
    StarredTerms,
    StudySetsOnFolders,
}

impl CountedTable {
    #[must_use]
    pub fn table_name(self) -> &'static str {
        match self {
            CountedTable::Users => "users",
            CountedTable::StudySets => "study_sets",
            CountedTable::Folders => "folders",
            CountedTable::Terms => "terms",
            CountedTable::StudySetExperiences => "study_set_experiences",
            CountedTable::FolderExperiences => "folder_experiences",
            CountedTable::StudiableTerms => "studiable_terms",
            CountedTable::StarredTerms => "starred_terms",
            CountedTable::StudySetsOnFolders => "study_sets_on_folders",
        }
    }
}

impl fmt::Display for CountedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Read-only aggregate queries.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Row count of a table.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count(&self, table: CountedTable) -> Result<u64, StorageError>;

    /// Number of users whose `last_seen_at` is at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_users_seen_since(&self, since: DateTime<Utc>) -> Result<u64, StorageError>;
}

//
// ─── IN-MEMORY ADAPTER ─────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    study_sets: HashMap<StudySetId, StudySet>,
    folders: HashMap<FolderId, Folder>,
    sets_on_folders: HashSet<(FolderId, StudySetId)>,
    starred: HashSet<(UserId, TermId)>,
    experiences: HashMap<(UserId, StudySetId), StudySetExperience>,
    folder_visits: HashMap<(UserId, FolderId), DateTime<Utc>>,
    studiable: HashMap<(UserId, TermId), u32>,
}

impl MemoryState {
    fn term_study_set(&self, term_id: TermId) -> Option<StudySetId> {
        self.study_sets
            .values()
            .find(|set| set.terms.iter().any(|t| t.id == term_id))
            .map(|set| set.id)
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let taken = guard.users.values().any(|u| {
            u.id != user.id
                && u.username
                    .as_str()
                    .eq_ignore_ascii_case(user.username.as_str())
        });
        if taken {
            return Err(StorageError::Conflict);
        }
        guard.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .users
            .values()
            .find(|u| u.username.as_str().eq_ignore_ascii_case(username.as_str()))
            .cloned())
    }

    async fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let user = guard.users.get_mut(&id).ok_or(StorageError::NotFound)?;
        user.last_seen_at = at;
        Ok(())
    }
}

#[async_trait]
impl StudySetRepository for InMemoryRepository {
    async fn upsert_study_set(&self, set: &StudySet) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.users.contains_key(&set.user_id) {
            return Err(StorageError::NotFound);
        }
        guard.study_sets.insert(set.id, set.clone());
        Ok(())
    }

    async fn get_study_set(&self, id: StudySetId) -> Result<Option<StudySet>, StorageError> {
        Ok(self.lock()?.study_sets.get(&id).cloned())
    }

    async fn list_sets_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<StudySetSummary>, StorageError> {
        let guard = self.lock()?;
        let mut sets: Vec<StudySetSummary> = guard
            .study_sets
            .values()
            .filter(|set| set.user_id == user_id)
            .map(StudySet::summary)
            .collect();
        sets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(sets)
    }

    async fn term_study_set(&self, term_id: TermId) -> Result<Option<StudySetId>, StorageError> {
        Ok(self.lock()?.term_study_set(term_id))
    }

    async fn set_starred(
        &self,
        user_id: UserId,
        term_id: TermId,
        starred: bool,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if guard.term_study_set(term_id).is_none() {
            return Err(StorageError::NotFound);
        }
        if starred {
            guard.starred.insert((user_id, term_id));
        } else {
            guard.starred.remove(&(user_id, term_id));
        }
        Ok(())
    }

    async fn list_starred(
        &self,
        user_id: UserId,
        study_set_id: StudySetId,
    ) -> Result<Vec<TermId>, StorageError> {
        let guard = self.lock()?;
        let Some(set) = guard.study_sets.get(&study_set_id) else {
            return Ok(Vec::new());
        };
        Ok(set
            .terms
            .iter()
            .filter(|t| guard.starred.contains(&(user_id, t.id)))
            .map(|t| t.id)
            .collect())
    }
}

#[async_trait]
impl FolderRepository for InMemoryRepository {
    async fn upsert_folder(&self, folder: &Folder) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.users.contains_key(&folder.user_id) {
            return Err(StorageError::NotFound);
        }
        guard.folders.insert(folder.id, folder.clone());
        Ok(())
    }

    async fn add_study_set(
        &self,
        folder_id: FolderId,
        study_set_id: StudySetId,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.folders.contains_key(&folder_id) || !guard.study_sets.contains_key(&study_set_id)
        {
            return Err(StorageError::NotFound);
        }
        guard.sets_on_folders.insert((folder_id, study_set_id));
        Ok(())
    }

    async fn list_folders_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FolderSummary>, StorageError> {
        let guard = self.lock()?;
        let mut folders: Vec<&Folder> = guard
            .folders
            .values()
            .filter(|f| f.user_id == user_id)
            .collect();
        folders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(folders
            .into_iter()
            .map(|f| {
                let count = guard
                    .sets_on_folders
                    .iter()
                    .filter(|(folder_id, _)| *folder_id == f.id)
                    .count();
                FolderSummary {
                    id: f.id,
                    title: f.title.clone(),
                    slug: f.slug.clone(),
                    study_set_count: u32::try_from(count).unwrap_or(u32::MAX),
                }
            })
            .collect())
    }
}

#[async_trait]
impl ExperienceRepository for InMemoryRepository {
    async fn complete_round(
        &self,
        user_id: UserId,
        study_set_id: StudySetId,
        at: DateTime<Utc>,
    ) -> Result<StudySetExperience, StorageError> {
        let mut guard = self.lock()?;
        if !guard.study_sets.contains_key(&study_set_id) {
            return Err(StorageError::NotFound);
        }
        let experience = guard
            .experiences
            .entry((user_id, study_set_id))
            .or_insert_with(|| StudySetExperience::new(user_id, study_set_id));
        experience.complete_round(at);
        Ok(experience.clone())
    }

    async fn get_experience(
        &self,
        user_id: UserId,
        study_set_id: StudySetId,
    ) -> Result<Option<StudySetExperience>, StorageError> {
        Ok(self
            .lock()?
            .experiences
            .get(&(user_id, study_set_id))
            .cloned())
    }

    async fn record_folder_visit(
        &self,
        user_id: UserId,
        folder_id: FolderId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.folders.contains_key(&folder_id) {
            return Err(StorageError::NotFound);
        }
        guard.folder_visits.insert((user_id, folder_id), at);
        Ok(())
    }

    async fn record_studiable_term(
        &self,
        user_id: UserId,
        term_id: TermId,
        round: u32,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if guard.term_study_set(term_id).is_none() {
            return Err(StorageError::NotFound);
        }
        guard.studiable.insert((user_id, term_id), round);
        Ok(())
    }
}

#[async_trait]
impl StatsRepository for InMemoryRepository {
    async fn count(&self, table: CountedTable) -> Result<u64, StorageError> {
        let guard = self.lock()?;
        let n = match table {
            CountedTable::Users => guard.users.len(),
            CountedTable::StudySets => guard.study_sets.len(),
            CountedTable::Folders => guard.folders.len(),
            CountedTable::Terms => guard.study_sets.values().map(|s| s.terms.len()).sum(),
            CountedTable::StudySetExperiences => guard.experiences.len(),
            CountedTable::FolderExperiences => guard.folder_visits.len(),
            CountedTable::StudiableTerms => guard.studiable.len(),
            CountedTable::StarredTerms => guard.starred.len(),
            CountedTable::StudySetsOnFolders => guard.sets_on_folders.len(),
        };
        Ok(u64::try_from(n).unwrap_or(u64::MAX))
    }

    async fn count_users_seen_since(&self, since: DateTime<Utc>) -> Result<u64, StorageError> {
        let guard = self.lock()?;
        let n = guard
            .users
            .values()
            .filter(|u| u.last_seen_at >= since)
            .count();
        Ok(u64::try_from(n).unwrap_or(u64::MAX))
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub study_sets: Arc<dyn StudySetRepository>,
    pub folders: Arc<dyn FolderRepository>,
    pub experiences: Arc<dyn ExperienceRepository>,
    pub stats: Arc<dyn StatsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Share one repository value across every trait object.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: UserRepository
            + StudySetRepository
            + FolderRepository
            + ExperienceRepository
            + StatsRepository
            + Clone
            + 'static,
    {
        let users: Arc<dyn UserRepository> = Arc::new(repo.clone());
        let study_sets: Arc<dyn StudySetRepository> = Arc::new(repo.clone());
        let folders: Arc<dyn FolderRepository> = Arc::new(repo.clone());
        let experiences: Arc<dyn ExperienceRepository> = Arc::new(repo.clone());
        let stats: Arc<dyn StatsRepository> = Arc::new(repo);
        Self {
            users,
            study_sets,
            folders,
            experiences,
            stats,
        }
    }
}
