//! Cycle outcome types
//!
//! These values describe what happened in a cycle. They exist for logging and
//! tests; nothing downstream branches on them.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use shared::PostId;

use crate::error::CuratorError;

/// Step of a branch at which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Fetch,
    LoadState,
    Session,
    Translate,
    Publish,
    Mirror,
}

impl CycleStage {
    /// Stage for an error raised while checking a tracker
    pub fn for_check_error(error: &CuratorError) -> Self {
        match error {
            CuratorError::PersistError { .. } => CycleStage::LoadState,
            CuratorError::Unauthorized { .. } => CycleStage::Session,
            _ => CycleStage::Fetch,
        }
    }
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleStage::Fetch => write!(f, "fetch"),
            CycleStage::LoadState => write!(f, "load_state"),
            CycleStage::Session => write!(f, "session"),
            CycleStage::Translate => write!(f, "translate"),
            CycleStage::Publish => write!(f, "publish"),
            CycleStage::Mirror => write!(f, "mirror"),
        }
    }
}

/// What the news branch did in one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsOutcome {
    NoTrustedSource,
    NothingNew,
    EmptyTranslation,
    /// `persisted == false` means the post went out but was not recorded, so
    /// the next cycle will publish it again.
    Published {
        post_id: PostId,
        title: String,
        persisted: bool,
    },
    Failed {
        stage: CycleStage,
        error: String,
    },
}

impl NewsOutcome {
    pub fn failed(stage: CycleStage, error: &CuratorError) -> Self {
        NewsOutcome::Failed {
            stage,
            error: error.to_string(),
        }
    }
}

impl fmt::Display for NewsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewsOutcome::NoTrustedSource => write!(f, "no trusted source"),
            NewsOutcome::NothingNew => write!(f, "nothing new"),
            NewsOutcome::EmptyTranslation => write!(f, "empty translation"),
            NewsOutcome::Published { post_id, persisted, .. } => {
                write!(f, "published {post_id}")?;
                if !persisted {
                    write!(f, " (unrecorded)")?;
                }
                Ok(())
            }
            NewsOutcome::Failed { stage, .. } => write!(f, "failed at {stage}"),
        }
    }
}

/// What the mirror branch did in one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// No monitored account configured
    Disabled,
    NoPost,
    NothingNew,
    Mirrored {
        post_id: PostId,
        persisted: bool,
    },
    Failed {
        stage: CycleStage,
        error: String,
    },
}

impl MirrorOutcome {
    pub fn failed(stage: CycleStage, error: &CuratorError) -> Self {
        MirrorOutcome::Failed {
            stage,
            error: error.to_string(),
        }
    }
}

impl fmt::Display for MirrorOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirrorOutcome::Disabled => write!(f, "disabled"),
            MirrorOutcome::NoPost => write!(f, "no post"),
            MirrorOutcome::NothingNew => write!(f, "nothing new"),
            MirrorOutcome::Mirrored { post_id, persisted } => {
                write!(f, "mirrored {post_id}")?;
                if !persisted {
                    write!(f, " (unrecorded)")?;
                }
                Ok(())
            }
            MirrorOutcome::Failed { stage, .. } => write!(f, "failed at {stage}"),
        }
    }
}

/// Summary of one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleResult {
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub news: NewsOutcome,
    pub mirror: MirrorOutcome,
}

impl CycleResult {
    pub fn published(&self) -> bool {
        matches!(self.news, NewsOutcome::Published { .. })
    }

    pub fn mirrored(&self) -> bool {
        matches!(self.mirror, MirrorOutcome::Mirrored { .. })
    }

    pub fn has_failures(&self) -> bool {
        matches!(self.news, NewsOutcome::Failed { .. }) || matches!(self.mirror, MirrorOutcome::Failed { .. })
    }
}

impl fmt::Display for CycleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cycle {} in {}ms: news {}, mirror {}",
            self.cycle,
            self.duration.as_millis(),
            self.news,
            self.mirror
        )
    }
}
