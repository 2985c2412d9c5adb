use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let signed_in = match ctx.current_user() {
        Some(id) => format!("Signed in as user {id}"),
        None => "Not signed in. Progress will not be saved.".to_string(),
    };

    rsx! {
        div { class: "page",
            h2 { "{ctx.app().app_name()}" }
            p { class: "muted", "{signed_in}" }
            match ctx.default_study_set() {
                Some(id) => rsx! {
                    Link { class: "primary", to: Route::Learn { id: id.value() }, "Start learning" }
                },
                None => rsx! {
                    p { "Open a profile to pick a study set." }
                },
            }
        }
    }
}
