use dioxus::prelude::*;
use study_core::model::TermId;

use crate::vm::FlashcardVm;

/// One term, front or back. Clicking the card flips it; the edit and star
/// buttons swallow the click so they never flip.
#[component]
pub fn Flashcard(
    card: FlashcardVm,
    on_flip: EventHandler<()>,
    on_previous: EventHandler<()>,
    on_next: EventHandler<()>,
    on_edit: EventHandler<TermId>,
    on_star: EventHandler<TermId>,
) -> Element {
    let term_id = card.term_id;
    let card_class = if card.flipped {
        "flashcard flipped"
    } else {
        "flashcard"
    };
    let star_class = if card.starred {
        "icon-btn starred"
    } else {
        "icon-btn"
    };
    let face_label = card.face_label();
    let face_text = card.face_text().to_string();
    let star_label = card.star_label();
    let progress = card.progress_label();

    rsx! {
        div { class: "flashcard-unit",
            div {
                id: "flashcard",
                class: "{card_class}",
                onclick: move |_| on_flip.call(()),
                div { class: "flashcard-toolbar",
                    span { class: "flashcard-face", "{face_label}" }
                    if card.can_edit {
                        button {
                            id: "flashcard-edit",
                            class: "icon-btn",
                            onclick: move |evt: MouseEvent| {
                                evt.stop_propagation();
                                on_edit.call(term_id);
                            },
                            "Edit"
                        }
                    }
                    button {
                        id: "flashcard-star",
                        class: "{star_class}",
                        onclick: move |evt: MouseEvent| {
                            evt.stop_propagation();
                            on_star.call(term_id);
                        },
                        "{star_label}"
                    }
                }
                p { class: "flashcard-text", "{face_text}" }
            }
            div { class: "flashcard-nav",
                button {
                    id: "flashcard-previous",
                    disabled: card.previous_disabled(),
                    onclick: move |_| on_previous.call(()),
                    "Previous"
                }
                span { class: "flashcard-progress", "{progress}" }
                button {
                    id: "flashcard-next",
                    disabled: card.next_disabled(),
                    onclick: move |_| on_next.call(()),
                    "Next"
                }
            }
        }
    }
}
