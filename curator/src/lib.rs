//! News curation and account mirroring agent
//!
//! Every cycle the agent picks the top trusted headline from a crypto news
//! feed, translates it and posts it if it has not posted it already, then
//! re-shares the newest post of a monitored account if it has not mirrored it
//! yet. All collaborators sit behind traits so the cycle logic is testable
//! without a network.

pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod scheduler;
pub mod services;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::CuratorConfig;
pub use crate::core::{AccountMirrorTracker, DomainTrustFilter, NewsChangeTracker, TrustedDomainSet};
pub use error::{CuratorError, CuratorResult};
pub use orchestrator::{CycleOrchestrator, CycleSettings};
pub use scheduler::{Scheduler, SchedulerReport, SchedulerState, StopReason};
pub use traits::*;
pub use types::{CycleResult, CycleStage, MirrorOutcome, NewsOutcome};
