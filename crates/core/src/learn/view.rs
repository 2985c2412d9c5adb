use crate::learn::{LearnState, StudySession};
use crate::model::Term;

/// What the learn page should show for a given session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyView<'a> {
    Interaction {
        term: &'a Term,
        index: usize,
        total: usize,
        round: u32,
        starred: bool,
    },
    RoundSummary {
        round: u32,
        terms_studied: usize,
    },
    Completed {
        rounds: u32,
    },
}

/// Map a session to exactly one view.
///
/// Completion wins over the round summary; anything else is the interaction view.
#[must_use]
pub fn select_view(session: &StudySession) -> StudyView<'_> {
    match session.state() {
        LearnState::Completed => StudyView::Completed {
            rounds: session.rounds_completed(),
        },
        LearnState::RoundSummary => StudyView::RoundSummary {
            round: session.round(),
            terms_studied: session.term_count(),
        },
        LearnState::Active { index } => {
            // `index < term_count` holds while active.
            let term = &session.terms()[index];
            StudyView::Interaction {
                term,
                index,
                total: session.term_count(),
                round: session.round(),
                starred: session.is_starred(term.id),
            }
        }
    }
}
