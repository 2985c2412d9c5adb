use dioxus::prelude::*;
use dioxus_router::Link;
use services::HydrationState;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::ViewError;
use crate::vm::ProfileVm;

/// Profile page for `/@username`. A new route segment restarts the lookup and
/// drops the one in flight.
#[component]
pub fn ProfileView(username: String) -> Element {
    let ctx = use_context::<AppContext>();
    let hydrator = ctx.profiles();
    let current_user = ctx.current_user();

    let mut resource = use_resource(use_reactive((&username,), move |(username,)| {
        let hydrator = hydrator.clone();
        async move {
            let route = Some(username.as_str()).filter(|raw| !raw.is_empty());
            hydrator.hydrate(route, current_user).await
        }
    }));

    let state = resource
        .read()
        .clone()
        .unwrap_or(HydrationState::Loading);

    match state {
        HydrationState::Loading => rsx! {
            div { class: "page",
                p { "Loading..." }
            }
        },
        HydrationState::NotFound => rsx! {
            ProfileNotFound { username }
        },
        HydrationState::Failed(_) => rsx! {
            div { class: "page",
                p { class: "error", "{ViewError::Unknown.message()}" }
                button { onclick: move |_| resource.restart(), "Retry" }
            }
        },
        HydrationState::Ready(data) => rsx! {
            ProfilePage { profile: ProfileVm::from(&data) }
        },
    }
}

#[component]
fn ProfileNotFound(username: String) -> Element {
    rsx! {
        div { class: "page not-found",
            h2 { "Profile not found" }
            p { "There is no user called {username}." }
            Link { to: Route::Home {}, "Back home" }
        }
    }
}

/// The hydrated profile arrives as a prop; nothing below reads it from context.
#[component]
pub fn ProfilePage(profile: ProfileVm) -> Element {
    rsx! {
        div { class: "page profile",
            ProfileHeader { profile: profile.clone() }
            section { class: "profile-sets",
                h3 { "{profile.sets_heading()}" }
                if profile.study_sets.is_empty() {
                    p { class: "muted", "No study sets yet." }
                }
                ul {
                    for set in profile.study_sets.iter() {
                        li { key: "{set.id}",
                            Link { to: Route::Learn { id: set.id.value() }, "{set.title}" }
                            span { class: "muted", " {set.term_count} · {set.created}" }
                        }
                    }
                }
            }
            if !profile.folders.is_empty() {
                section { class: "profile-folders",
                    h3 { "Folders" }
                    ul {
                        for folder in profile.folders.iter() {
                            li { key: "{folder.slug}",
                                span { "{folder.title}" }
                                span { class: "muted", " {folder.set_count}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ProfileHeader(profile: ProfileVm) -> Element {
    rsx! {
        header { class: "profile-header",
            if let Some(image) = profile.image.clone() {
                img { class: "avatar", src: "{image}", alt: "{profile.display_name}" }
            }
            div {
                h2 {
                    "{profile.display_name}"
                    if profile.verified {
                        span { class: "badge", title: "Verified", " ✓" }
                    }
                }
                p { class: "muted", "{profile.handle}" }
                if profile.is_me {
                    p { class: "badge", "This is you" }
                }
            }
        }
    }
}
