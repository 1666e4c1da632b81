//! Test helpers and builder patterns for cycle tests
//!
//! The builder starts from permissive mocks (empty feed, no posts, every call
//! succeeds) and each `with_*` call replaces one mock with a freshly
//! configured one, so expectations never overlap.

use curator::services::RealStateStore;
use curator::*;
use shared::{FeedEntry, LastMirrorRecord, LastNewsRecord, MirroredPost, NewsItem, PostId};
use tempfile::TempDir;

use super::fixtures::TestFixtures;

/// Orchestrator wired to mocks and a real JSONL store in a temp dir
pub type TestOrchestrator = CycleOrchestrator<
    MockFeedSource,
    MockSocialSource,
    MockTranslator,
    MockPublisher,
    RealStateStore,
    MockSessionProvider,
>;

/// Same wiring with a mocked store, for persistence failure tests
pub type MockStoreOrchestrator = CycleOrchestrator<
    MockFeedSource,
    MockSocialSource,
    MockTranslator,
    MockPublisher,
    MockStateStore,
    MockSessionProvider,
>;

/// Builder pattern for creating test orchestrators with sensible defaults
pub struct OrchestratorBuilder {
    feed: MockFeedSource,
    social: MockSocialSource,
    translator: MockTranslator,
    publisher: MockPublisher,
    sessions: MockSessionProvider,
    account: Option<String>,
    settings: CycleSettings,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            feed: MockFeedSource::new(),
            social: MockSocialSource::new(),
            translator: MockTranslator::new(),
            publisher: MockPublisher::new(),
            sessions: MockSessionProvider::new(),
            account: None,
            settings: CycleSettings::default(),
        };

        builder.feed.expect_fetch_latest().returning(|| Ok(vec![])).times(0..);
        builder.social.expect_latest_post().returning(|_, _| Ok(None)).times(0..);
        builder
            .translator
            .expect_translate()
            .returning(|text, _| Ok(format!("ES {text}")))
            .times(0..);
        builder
            .publisher
            .expect_post()
            .returning(|_, _| Ok(PostId::from("1000")))
            .times(0..);
        builder.publisher.expect_mirror().returning(|_, _| Ok(())).times(0..);
        builder
            .sessions
            .expect_open_session()
            .returning(|| Ok(TestFixtures::session()))
            .times(0..);
        builder.sessions.expect_close_session().returning(|_| Ok(())).times(0..);

        builder
    }

    /// Feed that always returns `entries`
    pub fn with_feed_entries(self, entries: Vec<FeedEntry>) -> Self {
        self.with_feed(move |feed| {
            feed.expect_fetch_latest().returning(move || Ok(entries.clone()));
        })
    }

    /// Enable mirroring of the fixture account, which always reports `post`
    pub fn with_latest_post(self, post: Option<MirroredPost>) -> Self {
        self.mirroring(TestFixtures::ACCOUNT).with_social(move |social| {
            social
                .expect_latest_post()
                .returning(move |_, _| Ok(post.clone()));
        })
    }

    pub fn mirroring(mut self, account: &str) -> Self {
        self.account = Some(account.to_string());
        self
    }

    pub fn with_settings(mut self, settings: CycleSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_feed<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockFeedSource),
    {
        self.feed = MockFeedSource::new();
        setup(&mut self.feed);
        self
    }

    pub fn with_social<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockSocialSource),
    {
        self.social = MockSocialSource::new();
        setup(&mut self.social);
        self
    }

    pub fn with_translator<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockTranslator),
    {
        self.translator = MockTranslator::new();
        setup(&mut self.translator);
        self
    }

    pub fn with_publisher<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockPublisher),
    {
        self.publisher = MockPublisher::new();
        setup(&mut self.publisher);
        self
    }

    pub fn with_sessions<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockSessionProvider),
    {
        self.sessions = MockSessionProvider::new();
        setup(&mut self.sessions);
        self
    }

    /// Build against a fresh JSONL store. Keep the `TempDir` alive for the test.
    pub async fn build(self) -> (TestOrchestrator, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RealStateStore::open(dir.path()).await.unwrap();
        (self.build_with_store(store), dir)
    }

    pub fn build_with_store<St: StateStore + 'static>(
        self,
        store: St,
    ) -> CycleOrchestrator<MockFeedSource, MockSocialSource, MockTranslator, MockPublisher, St, MockSessionProvider>
    {
        let news = NewsChangeTracker::new(self.feed, DomainTrustFilter::new(TestFixtures::trusted_domains()));
        let mirror = self
            .account
            .map(|account| AccountMirrorTracker::new(self.social, account));

        CycleOrchestrator::new(
            news,
            mirror,
            self.translator,
            self.publisher,
            store,
            self.sessions,
            self.settings,
        )
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper functions for common test operations
pub struct TestHelpers;

impl TestHelpers {
    /// Seed the store with a news record for `title`/`url`
    pub async fn seed_news(store: &impl StateStore, title: &str, url: &str) {
        store
            .append_news(LastNewsRecord::new(&NewsItem {
                title: title.to_string(),
                url: url.to_string(),
            }))
            .await
            .unwrap();
    }

    pub async fn seed_mirror(store: &impl StateStore, post_id: &str) {
        store
            .append_mirror(LastMirrorRecord::new(PostId::from(post_id)))
            .await
            .unwrap();
    }

    /// Number of records in one of the store's JSONL files
    pub fn record_count(dir: &TempDir, file: &str) -> usize {
        std::fs::read_to_string(dir.path().join(file))
            .map(|content| content.lines().filter(|l| !l.trim().is_empty()).count())
            .unwrap_or(0)
    }
}
