use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::model::{StudySetId, Term, TermId};

//
// ─── STATE, ACTIONS, EFFECTS ───────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnState {
    Active { index: usize },
    RoundSummary,
    Completed,
}

impl fmt::Display for LearnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearnState::Active { index } => write!(f, "active({index})"),
            LearnState::RoundSummary => f.write_str("round summary"),
            LearnState::Completed => f.write_str("completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnAction {
    Advance,
    Retreat,
    AcknowledgeRoundSummary,
    ToggleStar,
}

impl fmt::Display for LearnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LearnAction::Advance => "advance",
            LearnAction::Retreat => "retreat",
            LearnAction::AcknowledgeRoundSummary => "acknowledge round summary",
            LearnAction::ToggleStar => "toggle star",
        };
        f.write_str(name)
    }
}

/// Work requested by a transition, executed outside the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnEffect {
    /// A round finished; tell the progress tracker.
    CompleteRound { study_set_id: StudySetId, round: u32 },
    /// The user starred or unstarred a term.
    SetStarred { term_id: TermId, starred: bool },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LearnError {
    #[error("a study session needs at least one term")]
    NoTerms,

    #[error("cannot {action} while {state}")]
    InvalidTransition { action: LearnAction, state: LearnState },

    #[error("term {0:?} is not part of this session")]
    UnknownTerm(TermId),
}

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: LearnState,
    pub effects: Vec<LearnEffect>,
}

impl Transition {
    fn quiet(state: LearnState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-progress "learn" session over the terms of one study set.
///
/// Invariants:
/// - `terms` is never empty.
/// - While `Active { index }`, `index < terms.len()`.
/// - `CompleteRound` is emitted at most once per round.
#[derive(Debug, Clone)]
pub struct StudySession {
    study_set_id: StudySetId,
    terms: Vec<Term>,
    starred: HashSet<TermId>,
    state: LearnState,
    round: u32,
    notified_round: Option<u32>,
    rounds_completed: u32,
}

impl StudySession {
    /// Start a session at the first term of round 1.
    ///
    /// # Errors
    ///
    /// Returns `LearnError::NoTerms` when `terms` is empty.
    pub fn new(study_set_id: StudySetId, terms: Vec<Term>) -> Result<Self, LearnError> {
        if terms.is_empty() {
            return Err(LearnError::NoTerms);
        }
        Ok(Self {
            study_set_id,
            terms,
            starred: HashSet::new(),
            state: LearnState::Active { index: 0 },
            round: 1,
            notified_round: None,
            rounds_completed: 0,
        })
    }

    /// Seed the starred set, ignoring ids that are not in this session.
    #[must_use]
    pub fn with_starred(mut self, starred: impl IntoIterator<Item = TermId>) -> Self {
        let known: HashSet<TermId> = self.terms.iter().map(|t| t.id).collect();
        self.starred = starred.into_iter().filter(|id| known.contains(id)).collect();
        self
    }

    #[must_use]
    pub fn study_set_id(&self) -> StudySetId {
        self.study_set_id
    }

    #[must_use]
    pub fn state(&self) -> LearnState {
        self.state
    }

    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    #[must_use]
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Index of the current term; `None` outside `Active`.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            LearnState::Active { index } => Some(index),
            LearnState::RoundSummary | LearnState::Completed => None,
        }
    }

    #[must_use]
    pub fn current_term(&self) -> Option<&Term> {
        self.current_index().and_then(|i| self.terms.get(i))
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == LearnState::Completed
    }

    #[must_use]
    pub fn round_summary_pending(&self) -> bool {
        self.state == LearnState::RoundSummary
    }

    /// Current round number, starting at 1.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    /// One-based position within the round, paired with the term count.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        let done = match self.state {
            LearnState::Active { index } => index + 1,
            LearnState::RoundSummary | LearnState::Completed => self.terms.len(),
        };
        (done, self.terms.len())
    }

    #[must_use]
    pub fn is_starred(&self, term_id: TermId) -> bool {
        self.starred.contains(&term_id)
    }

    /// Move to the next term; past the last term the round ends.
    ///
    /// # Errors
    ///
    /// Returns `LearnError::InvalidTransition` outside `Active`.
    pub fn advance(&mut self) -> Result<Transition, LearnError> {
        let LearnState::Active { index } = self.state else {
            return Err(self.invalid(LearnAction::Advance));
        };

        let next = index + 1;
        if next < self.terms.len() {
            self.state = LearnState::Active { index: next };
            return Ok(Transition::quiet(self.state));
        }

        self.state = LearnState::RoundSummary;
        self.rounds_completed = self.rounds_completed.saturating_add(1);

        let mut effects = Vec::with_capacity(1);
        if self.notified_round != Some(self.round) {
            self.notified_round = Some(self.round);
            effects.push(LearnEffect::CompleteRound {
                study_set_id: self.study_set_id,
                round: self.round,
            });
        }

        Ok(Transition {
            state: self.state,
            effects,
        })
    }

    /// Step back one term; a no-op on the first term.
    ///
    /// # Errors
    ///
    /// Returns `LearnError::InvalidTransition` outside `Active`.
    pub fn retreat(&mut self) -> Result<Transition, LearnError> {
        let LearnState::Active { index } = self.state else {
            return Err(self.invalid(LearnAction::Retreat));
        };
        self.state = LearnState::Active {
            index: index.saturating_sub(1),
        };
        Ok(Transition::quiet(self.state))
    }

    /// Leave the round summary, either into a fresh round or to completion.
    ///
    /// # Errors
    ///
    /// Returns `LearnError::InvalidTransition` outside `RoundSummary`.
    pub fn acknowledge_round_summary(&mut self, continue_: bool) -> Result<Transition, LearnError> {
        if self.state != LearnState::RoundSummary {
            return Err(self.invalid(LearnAction::AcknowledgeRoundSummary));
        }

        if continue_ {
            self.round = self.round.saturating_add(1);
            self.state = LearnState::Active { index: 0 };
        } else {
            self.state = LearnState::Completed;
        }
        Ok(Transition::quiet(self.state))
    }

    /// Flip the starred flag of a term in this session.
    ///
    /// # Errors
    ///
    /// Returns `LearnError::UnknownTerm` for ids outside the session and
    /// `LearnError::InvalidTransition` once the session is completed.
    pub fn toggle_star(&mut self, term_id: TermId) -> Result<Transition, LearnError> {
        if self.state == LearnState::Completed {
            return Err(self.invalid(LearnAction::ToggleStar));
        }
        if !self.terms.iter().any(|t| t.id == term_id) {
            return Err(LearnError::UnknownTerm(term_id));
        }

        let starred = if self.starred.remove(&term_id) {
            false
        } else {
            self.starred.insert(term_id);
            true
        };

        Ok(Transition {
            state: self.state,
            effects: vec![LearnEffect::SetStarred { term_id, starred }],
        })
    }

    fn invalid(&self, action: LearnAction) -> LearnError {
        LearnError::InvalidTransition {
            action,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(n: u64) -> Vec<Term> {
        (1..=n)
            .map(|i| {
                Term::new(
                    TermId::new(i),
                    StudySetId::new(1),
                    format!("word {i}"),
                    format!("definition {i}"),
                    u32::try_from(i).unwrap(),
                )
                .unwrap()
            })
            .collect()
    }

    fn session(n: u64) -> StudySession {
        StudySession::new(StudySetId::new(1), terms(n)).unwrap()
    }

    fn complete_round_count(effects: &[LearnEffect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, LearnEffect::CompleteRound { .. }))
            .count()
    }

    #[test]
    fn empty_session_is_rejected() {
        let err = StudySession::new(StudySetId::new(1), Vec::new()).unwrap_err();
        assert_eq!(err, LearnError::NoTerms);
    }

    #[test]
    fn three_advances_over_three_terms_reach_round_summary() {
        let mut s = session(3);
        assert_eq!(s.state(), LearnState::Active { index: 0 });

        s.advance().unwrap();
        assert_eq!(s.state(), LearnState::Active { index: 1 });
        s.advance().unwrap();
        assert_eq!(s.state(), LearnState::Active { index: 2 });

        let t = s.advance().unwrap();
        assert_eq!(t.state, LearnState::RoundSummary);
        assert!(s.round_summary_pending());
        assert!(!s.is_completed());
        assert_eq!(
            t.effects,
            vec![LearnEffect::CompleteRound {
                study_set_id: StudySetId::new(1),
                round: 1,
            }]
        );
    }

    #[test]
    fn index_stays_in_bounds_while_active() {
        let mut s = session(4);
        for _ in 0..3 {
            s.retreat().unwrap();
            assert_eq!(s.current_index(), Some(0));
        }
        let mut seen = Vec::new();
        while let Some(index) = s.current_index() {
            assert!(index < s.term_count());
            seen.push(index);
            s.advance().unwrap();
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn round_summary_is_notified_once_per_round() {
        let mut s = session(2);
        let mut effects = Vec::new();
        effects.extend(s.advance().unwrap().effects);
        effects.extend(s.advance().unwrap().effects);
        assert_eq!(complete_round_count(&effects), 1);

        // Repeated actions while the summary is showing never re-notify.
        assert!(s.advance().is_err());
        assert!(s.retreat().is_err());
        effects.extend(s.toggle_star(TermId::new(1)).unwrap().effects);
        assert_eq!(complete_round_count(&effects), 1);

        s.acknowledge_round_summary(true).unwrap();
        effects.extend(s.advance().unwrap().effects);
        effects.extend(s.advance().unwrap().effects);
        assert_eq!(complete_round_count(&effects), 2);
        assert_eq!(s.rounds_completed(), 2);
    }

    #[test]
    fn acknowledge_continue_starts_a_new_round() {
        let mut s = session(1);
        s.advance().unwrap();
        let t = s.acknowledge_round_summary(true).unwrap();
        assert_eq!(t.state, LearnState::Active { index: 0 });
        assert_eq!(s.round(), 2);
    }

    #[test]
    fn acknowledge_stop_completes() {
        let mut s = session(1);
        s.advance().unwrap();
        let t = s.acknowledge_round_summary(false).unwrap();
        assert_eq!(t.state, LearnState::Completed);
        assert!(s.is_completed());
        assert!(!s.round_summary_pending());
        assert_eq!(s.progress(), (1, 1));
    }

    #[test]
    fn acknowledge_outside_summary_is_invalid() {
        let mut s = session(2);
        let err = s.acknowledge_round_summary(true).unwrap_err();
        assert_eq!(
            err,
            LearnError::InvalidTransition {
                action: LearnAction::AcknowledgeRoundSummary,
                state: LearnState::Active { index: 0 },
            }
        );
        assert_eq!(s.state(), LearnState::Active { index: 0 });
    }

    #[test]
    fn completed_is_terminal() {
        let mut s = session(1);
        s.advance().unwrap();
        s.acknowledge_round_summary(false).unwrap();
        assert!(s.advance().is_err());
        assert!(s.retreat().is_err());
        assert!(s.acknowledge_round_summary(true).is_err());
        assert!(s.toggle_star(TermId::new(1)).is_err());
        assert_eq!(s.state(), LearnState::Completed);
    }

    #[test]
    fn toggle_star_flips_and_emits_effect() {
        let mut s = session(2).with_starred([TermId::new(2), TermId::new(99)]);
        assert!(s.is_starred(TermId::new(2)));
        assert!(!s.is_starred(TermId::new(99)));

        let t = s.toggle_star(TermId::new(1)).unwrap();
        assert_eq!(
            t.effects,
            vec![LearnEffect::SetStarred {
                term_id: TermId::new(1),
                starred: true,
            }]
        );
        let t = s.toggle_star(TermId::new(1)).unwrap();
        assert_eq!(
            t.effects,
            vec![LearnEffect::SetStarred {
                term_id: TermId::new(1),
                starred: false,
            }]
        );
        assert_eq!(
            s.toggle_star(TermId::new(7)).unwrap_err(),
            LearnError::UnknownTerm(TermId::new(7))
        );
    }

    #[test]
    fn error_messages_name_action_and_state() {
        let mut s = session(1);
        s.advance().unwrap();
        let err = s.retreat().unwrap_err();
        assert_eq!(err.to_string(), "cannot retreat while round summary");
    }
}
