//! Change detection for a monitored account's latest post

use shared::{component_debug, Component, LastMirrorRecord, MirroredPost, PostId, Session};

use crate::error::CuratorResult;
use crate::traits::{SocialSource, StateStore};

/// Result of one mirror check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorCheck {
    /// The account has no post available
    NoPost,
    /// The latest post was already mirrored
    Unchanged(PostId),
    /// The latest post has not been mirrored yet
    New(MirroredPost),
}

/// Id-only comparison. Unlike the news check there is a single field, so a
/// missing record or any different id means new.
pub fn is_new_post(post: &MirroredPost, last: Option<&LastMirrorRecord>) -> bool {
    last.map(|record| record.post_id != post.id).unwrap_or(true)
}

/// Tracks the most recent post of one monitored account
pub struct AccountMirrorTracker<S>
where
    S: SocialSource,
{
    source: S,
    account: String,
}

impl<S> AccountMirrorTracker<S>
where
    S: SocialSource,
{
    pub fn new(source: S, account: impl Into<String>) -> Self {
        Self {
            source,
            account: account.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub async fn check_for_update<St>(&self, session: &Session, store: &St) -> CuratorResult<MirrorCheck>
    where
        St: StateStore + ?Sized,
    {
        let Some(post) = self.source.latest_post(session, &self.account).await? else {
            component_debug!(Component::Mirror, "No post available for {}", self.account);
            return Ok(MirrorCheck::NoPost);
        };

        let last = store.latest_mirror().await?;
        component_debug!(
            Component::Mirror,
            "Latest post {} vs stored {:?}",
            post.id,
            last.as_ref().map(|r| r.post_id.as_str())
        );

        if is_new_post(&post, last.as_ref()) {
            Ok(MirrorCheck::New(post))
        } else {
            Ok(MirrorCheck::Unchanged(post.id))
        }
    }
}
