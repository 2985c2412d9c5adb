use std::fmt;

use study_core::learn::{LearnError, LearnState, StudySession, StudyView, Transition, select_view};
use study_core::model::TermId;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::effects::EffectRunner;

/// Owned copy of the session state published to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearnSnapshot {
    pub state: LearnState,
    pub total: usize,
    pub round: u32,
    pub rounds_completed: u32,
}

impl LearnSnapshot {
    fn of(session: &StudySession) -> Self {
        Self {
            state: session.state(),
            total: session.term_count(),
            round: session.round(),
            rounds_completed: session.rounds_completed(),
        }
    }
}

/// Drives a `StudySession`: applies user actions, publishes snapshots and
/// hands emitted effects to the `EffectRunner`.
pub struct LearnController {
    session: StudySession,
    runner: EffectRunner,
    tx: watch::Sender<LearnSnapshot>,
    pending: Vec<JoinHandle<()>>,
}

impl fmt::Debug for LearnController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LearnController")
            .field("session", &self.session)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl LearnController {
    #[must_use]
    pub fn new(session: StudySession, runner: EffectRunner) -> Self {
        let (tx, _rx) = watch::channel(LearnSnapshot::of(&session));
        Self {
            session,
            runner,
            tx,
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &StudySession {
        &self.session
    }

    #[must_use]
    pub fn view(&self) -> StudyView<'_> {
        select_view(&self.session)
    }

    #[must_use]
    pub fn snapshot(&self) -> LearnSnapshot {
        *self.tx.borrow()
    }

    /// Receive a snapshot after every successful transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LearnSnapshot> {
        self.tx.subscribe()
    }

    /// # Errors
    ///
    /// Returns `LearnError` when the session is not active.
    pub fn advance(&mut self) -> Result<LearnSnapshot, LearnError> {
        let transition = self.session.advance()?;
        Ok(self.apply(transition))
    }

    /// # Errors
    ///
    /// Returns `LearnError` when the session is not active.
    pub fn retreat(&mut self) -> Result<LearnSnapshot, LearnError> {
        let transition = self.session.retreat()?;
        Ok(self.apply(transition))
    }

    /// # Errors
    ///
    /// Returns `LearnError` unless a round summary is showing.
    pub fn acknowledge_round_summary(
        &mut self,
        continue_: bool,
    ) -> Result<LearnSnapshot, LearnError> {
        let transition = self.session.acknowledge_round_summary(continue_)?;
        Ok(self.apply(transition))
    }

    /// # Errors
    ///
    /// Returns `LearnError` for unknown terms or a completed session.
    pub fn toggle_star(&mut self, term_id: TermId) -> Result<bool, LearnError> {
        let transition = self.session.toggle_star(term_id)?;
        self.apply(transition);
        Ok(self.session.is_starred(term_id))
    }

    /// Take the handles of effects spawned so far.
    pub fn drain_pending(&mut self) -> Vec<JoinHandle<()>> {
        std::mem::take(&mut self.pending)
    }

    fn apply(&mut self, transition: Transition) -> LearnSnapshot {
        self.pending.retain(|handle| !handle.is_finished());
        self.pending.extend(self.runner.run(transition.effects));

        let snapshot = LearnSnapshot::of(&self.session);
        self.tx.send_replace(snapshot);
        snapshot
    }
}
