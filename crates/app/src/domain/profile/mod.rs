//! Profiles and saved addresses

pub mod errors;
pub mod service;

pub use errors::ProfileError;
pub use service::{ProfileService, ProfileUpdate};
