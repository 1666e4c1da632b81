//! CryptoPanic news feed client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use shared::{component_debug, Component, FeedEntry};

use crate::error::{CuratorError, CuratorResult};
use crate::traits::FeedSource;

const SOURCE_NAME: &str = "cryptopanic";

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    results: Vec<RawPost>,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    title: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    source: Option<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    domain: Option<String>,
}

impl From<RawPost> for FeedEntry {
    fn from(post: RawPost) -> Self {
        FeedEntry {
            title: post.title,
            url: post.url.unwrap_or_default(),
            source_domain: post.source.and_then(|s| s.domain),
        }
    }
}

/// Public posts feed authenticated with an API token
#[derive(Clone)]
pub struct RealFeedSource {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RealFeedSource {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> CuratorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CuratorError::config("HTTP_TIMEOUT_SECS", format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl FeedSource for RealFeedSource {
    async fn fetch_latest(&self) -> CuratorResult<Vec<FeedEntry>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("auth_token", self.api_key.as_str()), ("public", "true")])
            .send()
            .await
            // the URL carries the token, keep it out of logs
            .map_err(|e| CuratorError::fetch(SOURCE_NAME, e.without_url().to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CuratorError::fetch(SOURCE_NAME, format!("API token rejected (HTTP {status})")));
        }
        if !status.is_success() {
            return Err(CuratorError::fetch(SOURCE_NAME, format!("HTTP {status}")));
        }

        let body: PostsResponse = response
            .json()
            .await
            .map_err(|e| CuratorError::fetch(SOURCE_NAME, format!("invalid response: {}", e.without_url())))?;

        component_debug!(Component::News, "Fetched {} feed entries", body.results.len());
        Ok(body.results.into_iter().map(FeedEntry::from).collect())
    }
}
