//! Translation client for the public `translate_a/single` endpoint

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{CuratorError, CuratorResult};
use crate::traits::Translator;

#[derive(Clone)]
pub struct RealTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl RealTranslator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> CuratorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CuratorError::config("HTTP_TIMEOUT_SECS", format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

/// Join the translated segments of a `[[["seg", "orig", ..], ..], ..]` payload
fn join_segments(body: &Value) -> CuratorResult<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| CuratorError::translation("unexpected response shape"))?;

    segments
        .iter()
        .map(|segment| {
            segment
                .get(0)
                .and_then(Value::as_str)
                .ok_or_else(|| CuratorError::translation("segment without translated text"))
        })
        .collect::<CuratorResult<Vec<_>>>()
        .map(|parts| parts.concat())
}

#[async_trait]
impl Translator for RealTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> CuratorResult<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| CuratorError::translation(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CuratorError::translation(format!("HTTP {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CuratorError::translation(format!("invalid response: {}", e.without_url())))?;

        join_segments(&body)
    }
}
