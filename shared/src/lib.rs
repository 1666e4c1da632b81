//! Shared types for the news curation agent
//!
//! Contains the data model exchanged between the cycle logic and its
//! collaborators, the shared error type, and logging helpers.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
