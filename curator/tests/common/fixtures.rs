//! Test fixtures and data for cycle tests

use curator::TrustedDomainSet;
use shared::{FeedEntry, MirroredPost, PostId, Session, SessionAuth};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const TRUSTED_DOMAIN: &'static str = "example.com";
    pub const UNTRUSTED_DOMAIN: &'static str = "rumours.example.org";

    pub const HEADLINE: &'static str = "BTC hits new high";
    pub const HEADLINE_URL: &'static str = "https://example.com/a";

    pub const ACCOUNT: &'static str = "watched";
    pub const USER_ID: &'static str = "42";

    pub fn trusted_domains() -> TrustedDomainSet {
        TrustedDomainSet::from_domains([Self::TRUSTED_DOMAIN, "coindesk.com"])
    }

    pub fn entry(title: &str, url: &str, domain: Option<&str>) -> FeedEntry {
        FeedEntry {
            title: title.to_string(),
            url: url.to_string(),
            source_domain: domain.map(str::to_string),
        }
    }

    /// The headline of the first end-to-end scenario
    pub fn headline() -> FeedEntry {
        Self::entry(Self::HEADLINE, Self::HEADLINE_URL, Some(Self::TRUSTED_DOMAIN))
    }

    pub fn untrusted(title: &str) -> FeedEntry {
        Self::entry(title, "https://rumours.example.org/x", Some(Self::UNTRUSTED_DOMAIN))
    }

    pub fn post(id: &str) -> MirroredPost {
        MirroredPost {
            id: PostId::from(id),
            text: format!("post {id}"),
        }
    }

    pub fn session() -> Session {
        Session::new(Self::USER_ID, SessionAuth::Bearer("test-token".to_string()))
    }
}
