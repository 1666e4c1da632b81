//! Core shared types and identifiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};

/// Identifier of a post on the social platform
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One ranked entry as reported by the news feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub url: String,
    /// Domain the feed attributes the story to, if any
    pub source_domain: Option<String>,
}

impl FeedEntry {
    pub fn to_news_item(&self) -> NewsItem {
        NewsItem {
            title: self.title.clone(),
            url: self.url.clone(),
        }
    }
}

/// Candidate news item selected from the trusted feed entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
}

/// Most recent post of a monitored account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirroredPost {
    pub id: PostId,
    pub text: String,
}

/// Record of a published news item. Append-only: the latest by
/// `created_at` is the current one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastNewsRecord {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl LastNewsRecord {
    pub fn new(item: &NewsItem) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: item.title.clone(),
            url: item.url.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Record of a mirrored post. Same lifecycle as [`LastNewsRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMirrorRecord {
    pub id: Uuid,
    pub post_id: PostId,
    pub created_at: DateTime<Utc>,
}

impl LastMirrorRecord {
    pub fn new(post_id: PostId) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            created_at: Utc::now(),
        }
    }
}

/// A single browser-style cookie used for cookie-based sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
}

impl SessionCookie {
    /// Parse a JSON cookie array as exported from a browser session
    pub fn parse_jar(raw: &str) -> SharedResult<Vec<SessionCookie>> {
        let cookies: Vec<SessionCookie> =
            serde_json::from_str(raw).map_err(|e| SharedError::DeserializationError {
                message: format!("cookie jar: {e}"),
            })?;
        if cookies.is_empty() {
            return Err(SharedError::InvalidConfig {
                field: "cookies".to_string(),
                value: "[]".to_string(),
            });
        }
        Ok(cookies)
    }
}

/// Authorization material attached to every social-platform request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAuth {
    Bearer(String),
    Cookies {
        cookie_header: String,
        csrf_token: Option<String>,
    },
}

impl SessionAuth {
    /// Build cookie auth from a cookie jar. `ct0` doubles as the CSRF token.
    pub fn from_cookies(cookies: &[SessionCookie]) -> Self {
        let cookie_header = cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        let csrf_token = cookies
            .iter()
            .find(|c| c.name == "ct0")
            .map(|c| c.value.clone());
        SessionAuth::Cookies {
            cookie_header,
            csrf_token,
        }
    }
}

/// Authenticated social-platform session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Platform id of the authenticated account
    pub user_id: String,
    pub auth: SessionAuth,
    pub opened_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, auth: SessionAuth) -> Self {
        Self {
            user_id: user_id.into(),
            auth,
            opened_at: Utc::now(),
        }
    }
}

/// Component tag attached to every log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Scheduler,
    Cycle,
    News,
    Mirror,
    Session,
    Store,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Scheduler => write!(f, "scheduler"),
            Component::Cycle => write!(f, "cycle"),
            Component::News => write!(f, "news"),
            Component::Mirror => write!(f, "mirror"),
            Component::Session => write!(f, "session"),
            Component::Store => write!(f, "store"),
        }
    }
}
