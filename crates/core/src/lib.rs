#![forbid(unsafe_code)]

pub mod error;
pub mod learn;
pub mod model;
pub mod time;
pub mod version;

pub use error::Error;
pub use time::Clock;
pub use version::VersionInfo;
