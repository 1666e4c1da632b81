//! Cycle orchestrator
//!
//! Runs one check-and-act cycle across both trackers using injected
//! collaborators. The news branch and the mirror branch each catch their own
//! errors, so a failure in one never stops the other. State is only appended
//! after the corresponding side effect succeeded.

use std::time::Instant;

use chrono::Utc;
use shared::logging::{log_error, log_success, log_unrecorded};
use shared::{component_debug, component_info, component_warn, Component, LastMirrorRecord, LastNewsRecord, Session};

use crate::core::{compose_news_post, mark_tickers, AccountMirrorTracker, MirrorCheck, NewsChangeTracker, NewsCheck};
use crate::error::{CuratorError, CuratorResult};
use crate::traits::{CycleRunner, FeedSource, Publisher, SessionProvider, SocialSource, StateStore, Translator};
use crate::types::{CycleResult, CycleStage, MirrorOutcome, NewsOutcome};

/// Per-cycle text settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSettings {
    /// Language headlines are translated into
    pub target_lang: String,
    /// Prefix placed in front of ticker-like tokens
    pub ticker_marker: char,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            target_lang: "es".to_string(),
            ticker_marker: '$',
        }
    }
}

/// Coordinates the news and mirror trackers for one cycle at a time
pub struct CycleOrchestrator<F, S, T, P, St, A>
where
    F: FeedSource + 'static,
    S: SocialSource + 'static,
    T: Translator + 'static,
    P: Publisher + 'static,
    St: StateStore + 'static,
    A: SessionProvider + 'static,
{
    /// Trackers
    news: NewsChangeTracker<F>,
    mirror: Option<AccountMirrorTracker<S>>,

    /// Injected services
    translator: T,
    publisher: P,
    store: St,
    sessions: A,

    /// Authenticated session, opened on first use and dropped when rejected
    session: Option<Session>,

    settings: CycleSettings,
    cycles_run: u64,
}

impl<F, S, T, P, St, A> CycleOrchestrator<F, S, T, P, St, A>
where
    F: FeedSource + 'static,
    S: SocialSource + 'static,
    T: Translator + 'static,
    P: Publisher + 'static,
    St: StateStore + 'static,
    A: SessionProvider + 'static,
{
    /// Create a new orchestrator with injected dependencies.
    /// `mirror == None` disables the mirror branch.
    pub fn new(
        news: NewsChangeTracker<F>,
        mirror: Option<AccountMirrorTracker<S>>,
        translator: T,
        publisher: P,
        store: St,
        sessions: A,
        settings: CycleSettings,
    ) -> Self {
        Self {
            news,
            mirror,
            translator,
            publisher,
            store,
            sessions,
            session: None,
            settings,
            cycles_run: 0,
        }
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    /// Run one full cycle: news first, then mirror
    pub async fn run_cycle(&mut self) -> CycleResult {
        self.cycles_run += 1;
        let cycle = self.cycles_run;
        let started_at = Utc::now();
        let clock = Instant::now();

        component_debug!(Component::Cycle, "=== Starting cycle {} ===", cycle);

        let news = self.run_news_branch().await;
        let mirror = self.run_mirror_branch().await;

        let result = CycleResult {
            cycle,
            started_at,
            duration: clock.elapsed(),
            news,
            mirror,
        };
        component_info!(Component::Cycle, "📋 {}", result);
        result
    }

    /// Close the session and the store. Errors are logged, not returned.
    pub async fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            match self.sessions.close_session(session).await {
                Ok(()) => log_success(Component::Session, "Session closed"),
                Err(e) => log_error(Component::Session, "Session close", &e),
            }
        }
        match self.store.close().await {
            Ok(()) => log_success(Component::Store, "State store closed"),
            Err(e) => log_error(Component::Store, "State store close", &e),
        }
    }

    /// Reuse the open session or open a new one
    async fn session(&mut self) -> CuratorResult<Session> {
        if let Some(session) = &self.session {
            return Ok(session.clone());
        }
        let session = self.sessions.open_session().await?;
        component_info!(Component::Session, "🔑 Session opened for user {}", session.user_id);
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Drop the session when the platform rejected it so the next use re-opens it
    fn note_failure(&mut self, error: &CuratorError) {
        if error.is_unauthorized() && self.session.take().is_some() {
            component_warn!(Component::Session, "🔒 Session rejected, will re-open on next use");
        }
    }

    async fn run_news_branch(&mut self) -> NewsOutcome {
        let check = match self.news.check_for_update(&self.store).await {
            Ok(check) => check,
            Err(e) => {
                log_error(Component::News, "News check", &e);
                return NewsOutcome::failed(CycleStage::for_check_error(&e), &e);
            }
        };

        let item = match check {
            NewsCheck::NoTrustedSource => {
                component_info!(Component::News, "🚫 News ignored (no trusted source)");
                return NewsOutcome::NoTrustedSource;
            }
            NewsCheck::Unchanged(_) => {
                component_info!(Component::News, "⏳ No new news");
                return NewsOutcome::NothingNew;
            }
            NewsCheck::New(item) => item,
        };
        component_info!(Component::News, "📰 New headline: {}", item.title);

        let translated = match self.translator.translate(&item.title, &self.settings.target_lang).await {
            Ok(text) => text,
            Err(e) => {
                log_error(Component::News, "Translation", &e);
                return NewsOutcome::failed(CycleStage::Translate, &e);
            }
        };
        if translated.trim().is_empty() {
            component_warn!(Component::News, "🚨 Translation came back empty, skipping");
            return NewsOutcome::EmptyTranslation;
        }

        let text = compose_news_post(&mark_tickers(&translated, self.settings.ticker_marker));

        let session = match self.session().await {
            Ok(session) => session,
            Err(e) => {
                log_error(Component::Session, "Session open", &e);
                return NewsOutcome::failed(CycleStage::Session, &e);
            }
        };

        let post_id = match self.publisher.post(&session, &text).await {
            Ok(post_id) => post_id,
            Err(e) => {
                log_error(Component::News, "Publish", &e);
                self.note_failure(&e);
                return NewsOutcome::failed(CycleStage::Publish, &e);
            }
        };

        // Record the untranslated item: that is what the next check compares against.
        let persisted = match self.store.append_news(LastNewsRecord::new(&item)).await {
            Ok(()) => {
                log_success(Component::News, &format!("Published {} and recorded the headline", post_id));
                true
            }
            Err(e) => {
                log_unrecorded(Component::News, "Publish", &e);
                false
            }
        };

        NewsOutcome::Published {
            post_id,
            title: item.title,
            persisted,
        }
    }

    async fn run_mirror_branch(&mut self) -> MirrorOutcome {
        if self.mirror.is_none() {
            component_debug!(Component::Mirror, "⚠️ No monitored account configured");
            return MirrorOutcome::Disabled;
        }

        let session = match self.session().await {
            Ok(session) => session,
            Err(e) => {
                log_error(Component::Session, "Session open", &e);
                return MirrorOutcome::failed(CycleStage::Session, &e);
            }
        };

        let check = match &self.mirror {
            Some(tracker) => {
                component_debug!(Component::Mirror, "🔍 Checking account {}", tracker.account());
                tracker.check_for_update(&session, &self.store).await
            }
            None => return MirrorOutcome::Disabled,
        };

        let post = match check {
            Ok(MirrorCheck::New(post)) => post,
            Ok(MirrorCheck::NoPost) => {
                component_info!(Component::Mirror, "❌ No post found to mirror");
                return MirrorOutcome::NoPost;
            }
            Ok(MirrorCheck::Unchanged(_)) => {
                component_info!(Component::Mirror, "⏭️ No new posts to mirror");
                return MirrorOutcome::NothingNew;
            }
            Err(e) => {
                log_error(Component::Mirror, "Mirror check", &e);
                self.note_failure(&e);
                return MirrorOutcome::failed(CycleStage::for_check_error(&e), &e);
            }
        };
        component_info!(Component::Mirror, "🔄 New post detected: {}", post.id);

        if let Err(e) = self.publisher.mirror(&session, &post.id).await {
            log_error(Component::Mirror, "Mirror", &e);
            self.note_failure(&e);
            return MirrorOutcome::failed(CycleStage::Mirror, &e);
        }

        let persisted = match self.store.append_mirror(LastMirrorRecord::new(post.id.clone())).await {
            Ok(()) => {
                log_success(Component::Mirror, &format!("Mirrored post {}", post.id));
                true
            }
            Err(e) => {
                log_unrecorded(Component::Mirror, "Mirror", &e);
                false
            }
        };

        MirrorOutcome::Mirrored {
            post_id: post.id,
            persisted,
        }
    }
}

#[async_trait::async_trait]
impl<F, S, T, P, St, A> CycleRunner for CycleOrchestrator<F, S, T, P, St, A>
where
    F: FeedSource + 'static,
    S: SocialSource + 'static,
    T: Translator + 'static,
    P: Publisher + 'static,
    St: StateStore + 'static,
    A: SessionProvider + 'static,
{
    async fn run_cycle(&mut self) -> CycleResult {
        CycleOrchestrator::run_cycle(self).await
    }

    async fn shutdown(&mut self) {
        CycleOrchestrator::shutdown(self).await
    }
}
