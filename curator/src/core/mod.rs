//! Core curation logic: trust filtering, change detection, text shaping

pub mod compose;
pub mod mirror;
pub mod news;
pub mod trust;

pub use compose::{compose_news_post, mark_tickers};
pub use mirror::{AccountMirrorTracker, MirrorCheck};
pub use news::{NewsChangeTracker, NewsCheck};
pub use trust::{registrable_domain, DomainTrustFilter, TrustedDomainSet};
