use std::sync::Arc;

use dioxus::prelude::*;
use services::ProfileLookupError;
use services::profile::ProfileSource;
use study_core::model::{Profile, StudySetId, Term, TermId, UserId, Username};

use super::flashcard::Flashcard;
use super::test_harness::{
    OWNER, PRIVATE_SET, PUBLIC_SET, ViewKind, setup_view_harness, setup_view_harness_with_profiles,
};
use crate::vm::FlashcardVm;

fn button_tag<'a>(html: &'a str, id: &str) -> &'a str {
    let marker = format!("id=\"{id}\"");
    let at = html.find(&marker).unwrap_or_else(|| panic!("missing {id} in {html}"));
    let start = html[..at].rfind('<').unwrap();
    let end = at + html[at..].find('>').unwrap();
    &html[start..=end]
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_links_default_set() {
    let mut harness = setup_view_harness(ViewKind::Home, Some(OWNER)).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Study (test)"), "missing app name in {html}");
    assert!(html.contains("Start learning"), "missing link in {html}");
    assert!(html.contains("/learn/10"), "missing target in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn learn_view_smoke_renders_first_card() {
    let mut harness = setup_view_harness(ViewKind::Learn(PUBLIC_SET.value()), Some(OWNER)).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("German verbs"), "missing title in {html}");
    assert!(html.contains("Round 1"), "missing round in {html}");
    assert!(html.contains("word 1"), "missing term in {html}");
    assert!(html.contains("1 / 3"), "missing progress in {html}");
    assert!(html.contains("flashcard-edit"), "owner should see edit in {html}");
    assert!(!html.contains("Finish round"), "finish shown early in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn learn_view_smoke_hides_edit_from_other_viewers() {
    let mut harness = setup_view_harness(ViewKind::Learn(PUBLIC_SET.value()), None).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("word 1"), "missing term in {html}");
    assert!(!html.contains("flashcard-edit"), "edit leaked in {html}");
    assert!(html.contains("flashcard-star"), "missing star in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn learn_view_smoke_renders_not_found() {
    let mut harness = setup_view_harness(ViewKind::Learn(99), Some(OWNER)).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("This study set does not exist."), "missing error in {html}");
    assert!(!html.contains("Retry"), "not found must not offer retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn learn_view_smoke_hides_private_set_from_strangers() {
    let mut harness =
        setup_view_harness(ViewKind::Learn(PRIVATE_SET.value()), Some(UserId::new(2))).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("This study set does not exist."), "missing error in {html}");
    assert!(!html.contains("word 1"), "private term leaked in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn profile_view_smoke_renders_owner_profile() {
    let mut harness = setup_view_harness(ViewKind::Profile("@alice".into()), Some(OWNER)).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Alice"), "missing name in {html}");
    assert!(html.contains("@alice"), "missing handle in {html}");
    assert!(html.contains("This is you"), "missing is_me badge in {html}");
    assert!(html.contains("Your study sets"), "missing heading in {html}");
    assert!(html.contains("German verbs"), "missing public set in {html}");
    assert!(html.contains("Secret list"), "owner should see private set in {html}");
    assert!(html.contains(&format!("/learn/{PRIVATE_SET}")), "missing link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn profile_view_smoke_hides_private_sets_from_strangers() {
    let mut harness =
        setup_view_harness(ViewKind::Profile("@alice".into()), Some(UserId::new(2))).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("German verbs"), "missing public set in {html}");
    assert!(!html.contains("Secret list"), "private set leaked in {html}");
    assert!(!html.contains("This is you"), "wrong is_me in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn profile_view_smoke_renders_not_found() {
    let mut harness = setup_view_harness(ViewKind::Profile("@ghost".into()), None).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Profile not found"), "missing not found in {html}");
    assert!(!html.contains("Retry"), "not found must not offer retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn profile_view_smoke_without_username_stays_loading() {
    let mut harness = setup_view_harness(ViewKind::Profile(String::new()), None).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Loading..."), "expected loading in {html}");
}

struct FailingProfiles;

#[async_trait::async_trait]
impl ProfileSource for FailingProfiles {
    async fn profile(
        &self,
        _username: &Username,
        _viewer: Option<UserId>,
    ) -> Result<Profile, ProfileLookupError> {
        Err(ProfileLookupError::Unavailable("offline".into()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn profile_view_smoke_renders_error_state() {
    let mut harness = setup_view_harness_with_profiles(
        ViewKind::Profile("@alice".into()),
        Arc::new(FailingProfiles),
    )
    .await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Something went wrong"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[component]
fn FlashcardHarness(card: FlashcardVm) -> Element {
    rsx! {
        Flashcard {
            card,
            on_flip: |()| {},
            on_previous: |()| {},
            on_next: |()| {},
            on_edit: |_| {},
            on_star: |_| {},
        }
    }
}

fn render_card(index: usize, total: usize, starred: bool, can_edit: bool) -> String {
    let term = Term::new(TermId::new(1), StudySetId::new(1), "Hund", "dog", 0).unwrap();
    let card = FlashcardVm::new(&term, index, total, starred, false, can_edit);
    let mut dom = VirtualDom::new_with_props(FlashcardHarness, FlashcardHarnessProps { card });
    dom.rebuild_in_place();
    dioxus_ssr::render(&dom)
}

#[test]
fn flashcard_disables_previous_on_first_card() {
    let html = render_card(0, 3, false, false);
    assert!(button_tag(&html, "flashcard-previous").contains("disabled"));
    assert!(!button_tag(&html, "flashcard-next").contains("disabled"));
    assert!(html.contains("Hund"), "missing word in {html}");
}

#[test]
fn flashcard_disables_next_on_last_card() {
    let html = render_card(2, 3, false, false);
    assert!(!button_tag(&html, "flashcard-previous").contains("disabled"));
    assert!(button_tag(&html, "flashcard-next").contains("disabled"));
}

#[test]
fn flashcard_shows_edit_only_with_capability() {
    assert!(!render_card(0, 1, false, false).contains("flashcard-edit"));
    let html = render_card(0, 1, true, true);
    assert!(html.contains("flashcard-edit"), "missing edit in {html}");
    assert!(html.contains("Unstar"), "missing star state in {html}");
}
