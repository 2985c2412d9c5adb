mod flashcard_vm;
mod learn_vm;
mod profile_vm;
mod time_fmt;

pub use flashcard_vm::{CardFace, FlashcardVm};
pub use learn_vm::{LearnPageVm, LearnVm, start_learn};
pub use profile_vm::{FolderRowVm, ProfileVm, StudySetRowVm};
