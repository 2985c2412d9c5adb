use dioxus::prelude::*;
use dioxus_router::Link;
use services::LearnController;
use study_core::learn::LearnError;
use study_core::model::StudySetId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::flashcard::Flashcard;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{LearnVm, start_learn};

/// Run one controller action. Navigation resets the flip; starring keeps it.
fn apply(
    mut controller: Signal<Option<LearnController>>,
    mut flipped: Signal<bool>,
    mut error: Signal<Option<ViewError>>,
    reset_flip: bool,
    action: impl FnOnce(&mut LearnController) -> Result<(), LearnError>,
) {
    let result = match controller.write().as_mut() {
        Some(active) => action(active),
        None => return,
    };
    if reset_flip {
        flipped.set(false);
    }
    error.set(result.err().map(|_| ViewError::Unknown));
}

#[component]
pub fn LearnView(id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let viewer = ctx.current_user();
    let controller = use_signal(|| None::<LearnController>);
    let mut flipped = use_signal(|| false);
    let action_error = use_signal(|| None::<ViewError>);

    let learn = ctx.learn();
    let capability = ctx.capability();
    let mut resource = use_resource(use_reactive((&id,), move |(id,)| {
        let learn = learn.clone();
        let capability = capability.clone();
        let mut controller = controller;
        let mut flipped = flipped;
        async move {
            let (page, started) =
                start_learn(&learn, capability.as_ref(), StudySetId::new(id), viewer).await?;
            controller.set(Some(started));
            flipped.set(false);
            Ok::<_, ViewError>(page)
        }
    }));

    let page = match view_state_from_resource(&resource) {
        ViewState::Ready(page) => page,
        ViewState::Idle | ViewState::Loading => {
            return rsx! {
                div { class: "page",
                    p { "Loading..." }
                }
            };
        }
        ViewState::Error(err) => {
            return rsx! {
                div { class: "page",
                    p { class: "error", "{err.message()}" }
                    if err.is_retryable() {
                        button { onclick: move |_| resource.restart(), "Retry" }
                    }
                    Link { to: Route::Home {}, "Back home" }
                }
            };
        }
    };

    let Some(vm) = controller
        .read()
        .as_ref()
        .map(|active| LearnVm::from_controller(active, flipped(), page.can_edit))
    else {
        return rsx! {
            div { class: "page",
                p { "Loading..." }
            }
        };
    };

    let study_set_id = page.study_set_id;
    let edit_ctx = ctx.clone();

    rsx! {
        div { class: "page learn",
            header { class: "learn-header",
                h2 { "{page.title}" }
            }
            if let Some(err) = action_error() {
                p { class: "error", "{err.message()}" }
            }
            match vm {
                LearnVm::Interaction { card, round } => {
                    let is_last = card.is_last();
                    rsx! {
                        p { class: "learn-round", "Round {round}" }
                        Flashcard {
                            card,
                            on_flip: move |()| {
                                let current = flipped();
                                flipped.set(!current);
                            },
                            on_previous: move |()| {
                                apply(controller, flipped, action_error, true, |c| {
                                    c.retreat().map(|_| ())
                                });
                            },
                            on_next: move |()| {
                                apply(controller, flipped, action_error, true, |c| {
                                    c.advance().map(|_| ())
                                });
                            },
                            on_edit: move |term_id| edit_ctx.request_edit(study_set_id, term_id),
                            on_star: move |term_id| {
                                apply(controller, flipped, action_error, false, |c| {
                                    c.toggle_star(term_id).map(|_| ())
                                });
                            },
                        }
                        if is_last {
                            button {
                                id: "learn-finish-round",
                                class: "primary",
                                onclick: move |_| {
                                    apply(controller, flipped, action_error, true, |c| {
                                        c.advance().map(|_| ())
                                    });
                                },
                                "Finish round"
                            }
                        }
                    }
                }
                LearnVm::RoundSummary { round, terms_studied } => rsx! {
                    RoundSummary {
                        round,
                        terms_studied,
                        on_continue: move |()| {
                            apply(controller, flipped, action_error, true, |c| {
                                c.acknowledge_round_summary(true).map(|_| ())
                            });
                        },
                        on_finish: move |()| {
                            apply(controller, flipped, action_error, true, |c| {
                                c.acknowledge_round_summary(false).map(|_| ())
                            });
                        },
                    }
                },
                LearnVm::Completed { rounds } => rsx! {
                    Completed { rounds }
                },
            }
        }
    }
}

#[component]
fn RoundSummary(
    round: u32,
    terms_studied: String,
    on_continue: EventHandler<()>,
    on_finish: EventHandler<()>,
) -> Element {
    rsx! {
        section { class: "round-summary",
            h3 { "Round {round} complete" }
            p { "You went through {terms_studied}." }
            div { class: "actions",
                button {
                    id: "round-summary-continue",
                    class: "primary",
                    onclick: move |_| on_continue.call(()),
                    "Keep going"
                }
                button {
                    id: "round-summary-finish",
                    onclick: move |_| on_finish.call(()),
                    "Finish"
                }
            }
        }
    }
}

#[component]
fn Completed(rounds: String) -> Element {
    rsx! {
        section { class: "learn-completed",
            h3 { "All done" }
            p { "You finished {rounds}." }
            Link { to: Route::Home {}, "Back home" }
        }
    }
}
