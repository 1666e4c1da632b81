//! Trait definitions with mockall annotations for testing
//!
//! Every external collaborator of the cycle is expressed here as a capability
//! trait. The cycle logic only ever talks to these traits, the concrete HTTP
//! and file implementations live in `services`.

use std::time::Duration;

use shared::{FeedEntry, LastMirrorRecord, LastNewsRecord, MirroredPost, PostId, Session};

use crate::error::CuratorResult;
use crate::types::CycleResult;

/// Ranked news feed
///
/// The news tracker reads the whole ranked list once per cycle and picks the
/// first trusted entry itself, so implementations must not filter or reorder.
#[mockall::automock]
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the current ranked list of entries
    ///
    /// # Returns
    /// Entries highest-ranked first. An empty list is a valid answer; any
    /// transport, status or decode failure is a `FetchError`.
    async fn fetch_latest(&self) -> CuratorResult<Vec<FeedEntry>>;
}

/// Read access to a monitored social account
///
/// Used by the mirror tracker to find the newest post worth re-sharing.
#[mockall::automock]
#[async_trait::async_trait]
pub trait SocialSource: Send + Sync {
    /// Look up the most recent post of an account
    ///
    /// # Parameters
    /// - `session`: an open session from [`SessionProvider::open_session`]
    /// - `account`: handle of the monitored account, without the `@`
    ///
    /// # Returns
    /// `None` when the account has no posts. A rejected session is reported
    /// as `Unauthorized` so the caller can drop and re-open it.
    async fn latest_post(&self, session: &Session, account: &str) -> CuratorResult<Option<MirroredPost>>;
}

/// Outbound actions on the social platform
///
/// Both calls have a visible side effect. The orchestrator records state only
/// after they succeed, so a failure here means nothing was recorded and the
/// action is retried next cycle.
#[mockall::automock]
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// Publish a new post
    ///
    /// # Parameters
    /// - `session`: an open session
    /// - `text`: final post text, already composed and within the length limit
    ///
    /// # Returns
    /// Id of the created post, or `PublishError` (`Unauthorized` on 401)
    async fn post(&self, session: &Session, text: &str) -> CuratorResult<PostId>;

    /// Re-share an existing post verbatim
    ///
    /// # Parameters
    /// - `session`: an open session
    /// - `post_id`: id of the post to re-share
    ///
    /// # Returns
    /// `Ok(())` once the platform accepted the re-share, or `MirrorError`
    /// (`Unauthorized` on 401)
    async fn mirror(&self, session: &Session, post_id: &PostId) -> CuratorResult<()>;
}

/// Session lifecycle for the social platform
///
/// The orchestrator opens a session lazily, reuses it across cycles and
/// drops it when a call reports `Unauthorized`.
#[mockall::automock]
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    /// Establish an authenticated session from the configured credentials
    ///
    /// # Returns
    /// A session carrying the authenticated user's id. Rejected credentials
    /// are `Unauthorized`; any other failure is a `SessionError`.
    async fn open_session(&self) -> CuratorResult<Session>;

    /// Release a session on shutdown
    ///
    /// Implementations backed by long-lived credentials (a bearer token or an
    /// exported cookie jar) have nothing to revoke and may treat this as a
    /// local no-op. Callers must not rely on it invalidating the credentials.
    ///
    /// # Parameters
    /// - `session`: the session to release; it is consumed either way
    async fn close_session(&self, session: Session) -> CuratorResult<()>;
}

/// Text translation
#[mockall::automock]
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_lang` (a language code such as `en`).
    /// An empty result is returned as-is; the caller decides what to do with it.
    async fn translate(&self, text: &str, target_lang: &str) -> CuratorResult<String>;
}

/// Append-only "last seen" records for both trackers
///
/// Records are never updated or deleted. "Latest" means the record with the
/// greatest `created_at`, not the last one written.
#[mockall::automock]
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    /// Most recent news record by creation time
    ///
    /// # Returns
    /// `None` when nothing was recorded yet, `PersistError` when the store
    /// cannot be read or is closed
    async fn latest_news(&self) -> CuratorResult<Option<LastNewsRecord>>;

    /// Durably append a news record
    ///
    /// # Parameters
    /// - `record`: the headline that was just published
    ///
    /// # Returns
    /// `Ok(())` once the record is on disk, `PersistError` otherwise
    async fn append_news(&self, record: LastNewsRecord) -> CuratorResult<()>;

    /// Most recent mirror record by creation time
    ///
    /// # Returns
    /// `None` when nothing was recorded yet, `PersistError` when the store
    /// cannot be read or is closed
    async fn latest_mirror(&self) -> CuratorResult<Option<LastMirrorRecord>>;

    /// Durably append a mirror record
    ///
    /// # Parameters
    /// - `record`: the post that was just re-shared
    ///
    /// # Returns
    /// `Ok(())` once the record is on disk, `PersistError` otherwise
    async fn append_mirror(&self, record: LastMirrorRecord) -> CuratorResult<()>;

    /// Release any held resources; further calls fail
    async fn close(&self) -> CuratorResult<()>;
}

/// Delay source for the scheduler, injectable so tests run without waiting
#[mockall::automock]
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// One check-and-act cycle, driven by the scheduler
#[mockall::automock]
#[async_trait::async_trait]
pub trait CycleRunner: Send {
    /// Run both trackers once. Infallible: failures are reported in the result.
    async fn run_cycle(&mut self) -> CycleResult;

    /// Release held resources after the last cycle
    async fn shutdown(&mut self);
}

/// Tokio-backed sleeper used in production
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
