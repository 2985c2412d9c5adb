mod flashcard;
mod home;
mod learn;
mod profile;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use flashcard::Flashcard;
pub use home::HomeView;
pub use learn::LearnView;
pub use profile::{ProfilePage, ProfileView};
pub use state::{ViewError, ViewState, view_state_from_resource};
