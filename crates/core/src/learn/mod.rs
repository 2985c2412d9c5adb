//! "Learn" study mode: a pure state machine plus the view selector that reads it.
//!
//! Transitions never perform I/O. Side effects such as telling the progress
//! tracker that a round finished are returned as [`LearnEffect`] values for a
//! runner outside this crate to execute.

mod session;
mod view;

pub use session::{
    LearnAction, LearnEffect, LearnError, LearnState, StudySession, Transition,
};
pub use view::{StudyView, select_view};
