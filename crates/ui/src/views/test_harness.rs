use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use services::learn::CreatorOnly;
use services::profile::ProfileSource;
use services::{AppServices, Clock, MetricsConfig, ProfileHydrator, StudyClient};
use storage::repository::{Storage, StudySetRepository, UserRepository};
use study_core::model::{StudySet, StudySetId, Term, TermId, User, UserId, Username, Visibility};
use study_core::time::fixed_now;
use tokio::runtime::Handle;

use crate::context::{UiApp, build_app_context};
use crate::views::{HomeView, LearnView, ProfileView};

pub const OWNER: UserId = UserId::new(1);
pub const PUBLIC_SET: StudySetId = StudySetId::new(10);
pub const PRIVATE_SET: StudySetId = StudySetId::new(11);

struct TestApp {
    client: StudyClient,
    default_study_set: Option<StudySetId>,
}

impl UiApp for TestApp {
    fn app_name(&self) -> &str {
        "Study (test)"
    }

    fn study_client(&self) -> StudyClient {
        self.client.clone()
    }

    fn default_study_set(&self) -> Option<StudySetId> {
        self.default_study_set
    }

    fn request_edit(&self, _study_set_id: StudySetId, _term_id: TermId) {}
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Learn(u64),
    Profile(String),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    match use_context::<ViewKind>() {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Learn(id) => rsx! { LearnView { id } },
        ViewKind::Profile(username) => rsx! { ProfileView { username } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild and let pending resources resolve.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..4 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Alice owns a public and a private set of three terms each.
pub async fn seeded_storage() -> Storage {
    let storage = Storage::in_memory();
    storage
        .users
        .upsert_user(&User {
            id: OWNER,
            username: Username::new("alice").expect("username"),
            name: Some("Alice".into()),
            image: None,
            verified: true,
            last_seen_at: fixed_now(),
        })
        .await
        .expect("upsert user");

    for (set_id, title, visibility) in [
        (PUBLIC_SET, "German verbs", Visibility::Public),
        (PRIVATE_SET, "Secret list", Visibility::Private),
    ] {
        let terms = (1..=3)
            .map(|i| {
                Term::new(
                    TermId::new(set_id.value() * 10 + i),
                    set_id,
                    format!("word {i}"),
                    format!("definition {i}"),
                    u32::try_from(i).expect("rank"),
                )
                .expect("term")
            })
            .collect();
        let set = StudySet::new(set_id, OWNER, title, "", fixed_now(), visibility, terms)
            .expect("study set");
        storage
            .study_sets
            .upsert_study_set(&set)
            .await
            .expect("upsert set");
    }
    storage
}

pub async fn setup_view_harness(view: ViewKind, current_user: Option<UserId>) -> ViewHarness {
    let storage = seeded_storage().await;
    let services = AppServices::new(
        storage,
        Clock::fixed(fixed_now()),
        &MetricsConfig::new("test", "0.1.0"),
    )
    .expect("services");
    build_harness(view, services.study_client(current_user, Handle::current()))
}

pub async fn setup_view_harness_with_profiles(
    view: ViewKind,
    profiles: Arc<dyn ProfileSource>,
) -> ViewHarness {
    let storage = seeded_storage().await;
    let services = AppServices::new(
        storage,
        Clock::fixed(fixed_now()),
        &MetricsConfig::new("test", "0.1.0"),
    )
    .expect("services");
    let base = services.study_client(None, Handle::current());
    let client = StudyClient::new(
        base.learn().clone(),
        ProfileHydrator::new(profiles),
        Arc::new(CreatorOnly),
        None,
    );
    build_harness(view, client)
}

fn build_harness(view: ViewKind, client: StudyClient) -> ViewHarness {
    let app = Arc::new(TestApp {
        client,
        default_study_set: Some(PUBLIC_SET),
    });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });
    ViewHarness { dom }
}
