//! Change detection for the trusted news feed

use shared::{component_debug, Component, LastNewsRecord, NewsItem};

use crate::core::trust::DomainTrustFilter;
use crate::error::CuratorResult;
use crate::traits::{FeedSource, StateStore};

/// Result of one news check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsCheck {
    /// The feed had no entry from a trusted source
    NoTrustedSource,
    /// The top trusted entry matches the last published record
    Unchanged(NewsItem),
    /// The top trusted entry has not been published yet
    New(NewsItem),
}

/// Decide whether `candidate` differs from the last published record.
///
/// Conjunctive on purpose: the candidate is new only when BOTH title and url
/// differ. A retitled story at the same url, or the same headline at a new
/// url, counts as already published. This is stricter than the id-only
/// comparison used for mirroring and is kept as-is.
pub fn is_new_news(candidate: &NewsItem, last: Option<&LastNewsRecord>) -> bool {
    match last {
        None => true,
        Some(record) => candidate.title != record.title && candidate.url != record.url,
    }
}

/// Tracks the top trusted item of a news feed
pub struct NewsChangeTracker<F>
where
    F: FeedSource,
{
    feed: F,
    filter: DomainTrustFilter,
}

impl<F> NewsChangeTracker<F>
where
    F: FeedSource,
{
    pub fn new(feed: F, filter: DomainTrustFilter) -> Self {
        Self { feed, filter }
    }

    /// Fetch the feed and compare its top trusted item with the stored one.
    /// Never persists anything.
    pub async fn check_for_update<S>(&self, store: &S) -> CuratorResult<NewsCheck>
    where
        S: StateStore + ?Sized,
    {
        let entries = self.feed.fetch_latest().await?;
        let total = entries.len();

        let candidate = entries.into_iter().find(|entry| {
            entry
                .source_domain
                .as_deref()
                .map(|domain| self.filter.is_trusted(domain))
                .unwrap_or(false)
        });

        let Some(candidate) = candidate.map(|entry| entry.to_news_item()) else {
            component_debug!(Component::News, "No trusted source among {} feed entries", total);
            return Ok(NewsCheck::NoTrustedSource);
        };

        let last = store.latest_news().await?;
        component_debug!(
            Component::News,
            "Candidate '{}' vs stored {:?}",
            candidate.title,
            last.as_ref().map(|r| r.title.as_str())
        );

        if is_new_news(&candidate, last.as_ref()) {
            Ok(NewsCheck::New(candidate))
        } else {
            Ok(NewsCheck::Unchanged(candidate))
        }
    }
}
