//! Profile lookup and route hydration.

mod hydrator;
mod source;

pub use hydrator::{HydrationState, ProfileHydrator};
pub use source::{HttpProfileSource, ProfileSource, StorageProfileSource};
