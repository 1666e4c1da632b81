//! Common test utilities and infrastructure
//!
//! Shared fixtures and the orchestrator builder used by the integration
//! suites.

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{OrchestratorBuilder, TestHelpers};
