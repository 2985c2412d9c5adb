use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use services::profile::{ProfileSource, StorageProfileSource};
use services::{HydrationState, ProfileHydrator, ProfileLookupError};
use storage::repository::{FolderRepository, Storage, StudySetRepository, UserRepository};
use study_core::model::{
    Folder, FolderId, Profile, StudySet, StudySetId, User, UserId, Username, Visibility,
};
use study_core::time::fixed_now;

const ALICE: UserId = UserId::new(1);
const BOB: UserId = UserId::new(2);

async fn seeded_storage() -> Storage {
    let storage = Storage::in_memory();
    for (id, name) in [(ALICE, "alice"), (BOB, "bob")] {
        storage
            .users
            .upsert_user(&User {
                id,
                username: Username::new(name).unwrap(),
                name: Some(name.to_uppercase()),
                image: None,
                verified: id == ALICE,
                last_seen_at: fixed_now(),
            })
            .await
            .unwrap();
    }

    for (id, visibility) in [(1, Visibility::Public), (2, Visibility::Private)] {
        let set = StudySet::new(
            StudySetId::new(id),
            ALICE,
            format!("Set {id}"),
            "",
            fixed_now(),
            visibility,
            Vec::new(),
        )
        .unwrap();
        storage.study_sets.upsert_study_set(&set).await.unwrap();
    }

    let folder = Folder::new(FolderId::new(1), ALICE, "Languages", fixed_now()).unwrap();
    storage.folders.upsert_folder(&folder).await.unwrap();
    storage
        .folders
        .add_study_set(folder.id, StudySetId::new(1))
        .await
        .unwrap();
    storage
}

fn hydrator(storage: &Storage) -> ProfileHydrator {
    ProfileHydrator::new(Arc::new(StorageProfileSource::new(
        Arc::clone(&storage.users),
        Arc::clone(&storage.study_sets),
        Arc::clone(&storage.folders),
    )))
}

#[tokio::test]
async fn marker_is_stripped_and_owner_sees_everything() {
    let storage = seeded_storage().await;
    let state = hydrator(&storage).hydrate(Some("@alice"), Some(ALICE)).await;

    let HydrationState::Ready(data) = state else {
        panic!("expected Ready, got {state:?}");
    };
    assert!(data.is_me);
    assert!(data.profile.verified);
    assert_eq!(data.profile.username.as_str(), "alice");
    assert_eq!(data.profile.study_sets.len(), 2);
    assert_eq!(data.profile.folders.len(), 1);
    assert_eq!(data.profile.folders[0].study_set_count, 1);
}

#[tokio::test]
async fn other_viewers_see_public_sets_only() {
    let storage = seeded_storage().await;
    let state = hydrator(&storage).hydrate(Some("alice"), Some(BOB)).await;

    let data = state.profile().expect("ready");
    assert!(!data.is_me);
    let ids: Vec<_> = data.profile.study_sets.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![StudySetId::new(1)]);
}

#[tokio::test]
async fn unknown_username_is_not_found() {
    let storage = seeded_storage().await;
    let hydrator = hydrator(&storage);

    let state = hydrator.hydrate(Some("@carol"), Some(ALICE)).await;
    assert_eq!(state, HydrationState::NotFound);
    assert!(state.profile().is_none());

    let state = hydrator.hydrate(Some("@"), None).await;
    assert_eq!(state, HydrationState::NotFound);
}

struct CountingSource {
    calls: AtomicUsize,
    answer: Result<(), ProfileLookupError>,
}

#[async_trait]
impl ProfileSource for CountingSource {
    async fn profile(
        &self,
        username: &Username,
        _viewer: Option<UserId>,
    ) -> Result<Profile, ProfileLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()?;
        Ok(Profile {
            id: ALICE,
            username: username.clone(),
            image: None,
            verified: false,
            name: None,
            study_sets: Vec::new(),
            folders: Vec::new(),
        })
    }
}

#[tokio::test]
async fn missing_username_stays_loading_without_fetching() {
    let source = Arc::new(CountingSource {
        calls: AtomicUsize::new(0),
        answer: Ok(()),
    });
    let hydrator = ProfileHydrator::new(source.clone());

    assert_eq!(hydrator.hydrate(None, Some(ALICE)).await, HydrationState::Loading);
    assert_eq!(hydrator.hydrate(Some(""), Some(ALICE)).await, HydrationState::Loading);
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);

    let state = hydrator.hydrate(Some("@alice"), None).await;
    assert!(matches!(state, HydrationState::Ready(ref data) if !data.is_me));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transport_failures_are_distinct_from_not_found() {
    let source = Arc::new(CountingSource {
        calls: AtomicUsize::new(0),
        answer: Err(ProfileLookupError::Unavailable("503".into())),
    });
    let hydrator = ProfileHydrator::new(source);

    let state = hydrator.hydrate(Some("alice"), None).await;
    assert_eq!(
        state,
        HydrationState::Failed("profile unavailable: 503".into())
    );
}
