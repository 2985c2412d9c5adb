//! Learn sessions: loading, driving the state machine, and running its effects.

mod capability;
mod controller;
mod effects;
mod service;

pub use capability::{CreatorOnly, EditCapability};
pub use controller::{LearnController, LearnSnapshot};
pub use effects::{
    EffectRunner, ErrorReporter, HttpRoundNotifier, HttpStarWriter, RoundCompletionNotifier,
    StarWriter, StorageRoundNotifier, StorageStarWriter,
};
pub use service::{
    HttpStudySetSource, LearnMaterial, LearnService, StorageStudySetSource, StudySetSource,
};
