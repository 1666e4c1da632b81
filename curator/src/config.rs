//! Validated runtime configuration
//!
//! Values are loaded from, lowest precedence first:
//! 1. `.env` file in the current directory or parent directories (if present)
//! 2. System environment variables
//! 3. Command line overrides, keyed by the same variable names
//!
//! A key is resolved from the highest layer that sets it, so an override
//! replaces a bad environment value instead of failing on it. Everything is
//! validated once at startup; a bad value stops the process before the first
//! cycle.
//!
//! ## Required
//! - `CRYPTO_PANIC_API_KEY`
//! - `TWITTER_ACCESS_TOKEN` or `TWITTER_COOKIES` (JSON cookie array)
//!
//! ## Optional
//! - `TWITTER_MONITORED_ACCOUNT` (mirroring is disabled without it)
//! - `NEWS_API_URL`, `TWITTER_API_URL`, `TRANSLATE_API_URL`
//! - `TRANSLATE_TARGET_LANG` (default `es`)
//! - `POLL_INTERVAL_SECS` (default 60), `HTTP_TIMEOUT_SECS` (default 15)
//! - `TICKER_MARKER` (default `$`)
//! - `STATE_DIR` (default `./state`)
//! - `TRUSTED_DOMAINS_FILE` (default: bundled list)

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use shared::{SessionAuth, SessionCookie};

use crate::core::TrustedDomainSet;
use crate::error::{CuratorError, CuratorResult};
use crate::orchestrator::CycleSettings;

pub const DEFAULT_NEWS_API_URL: &str = "https://cryptopanic.com/api/v1/posts/";
pub const DEFAULT_TWITTER_API_URL: &str = "https://api.twitter.com";
pub const DEFAULT_TRANSLATE_API_URL: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_TARGET_LANG: &str = "es";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_STATE_DIR: &str = "./state";

/// Fully validated agent configuration
#[derive(Debug, Clone)]
pub struct CuratorConfig {
    pub news_api_key: String,
    pub news_api_url: String,
    pub twitter_api_url: String,
    pub translate_api_url: String,
    pub credentials: SessionAuth,
    pub monitored_account: Option<String>,
    pub target_lang: String,
    pub ticker_marker: char,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
    pub state_dir: PathBuf,
    pub trusted_domains: TrustedDomainSet,
}

impl CuratorConfig {
    /// Load `.env` then read the process environment
    pub fn from_env() -> CuratorResult<Self> {
        // Silently ignored when no .env file exists
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`], with `overrides` taking precedence
    pub fn from_env_with_overrides(overrides: &HashMap<String, String>) -> CuratorResult<Self> {
        let _ = dotenv::dotenv();
        Self::from_layers(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve each key from `overrides` first, then from `base`
    pub fn from_layers<L>(overrides: &HashMap<String, String>, base: L) -> CuratorResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| overrides.get(key).cloned().or_else(|| base(key)))
    }

    /// Build from a map, used by tests
    pub fn from_map(vars: &HashMap<String, String>) -> CuratorResult<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<L>(lookup: L) -> CuratorResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let news_api_key = get("CRYPTO_PANIC_API_KEY")
            .ok_or_else(|| CuratorError::config("CRYPTO_PANIC_API_KEY", "required but not set"))?;

        let credentials = match (get("TWITTER_COOKIES"), get("TWITTER_ACCESS_TOKEN")) {
            (Some(raw), _) => SessionAuth::from_cookies(&SessionCookie::parse_jar(&raw)?),
            (None, Some(token)) => SessionAuth::Bearer(token),
            (None, None) => {
                return Err(CuratorError::config(
                    "TWITTER_COOKIES",
                    "set TWITTER_COOKIES or TWITTER_ACCESS_TOKEN",
                ))
            }
        };

        let ticker_marker = match get("TICKER_MARKER") {
            None => '$',
            Some(raw) => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => return Err(CuratorError::config("TICKER_MARKER", "must be a single character")),
                }
            }
        };

        let trusted_domains = match get("TRUSTED_DOMAINS_FILE") {
            Some(path) => TrustedDomainSet::load(&PathBuf::from(path))?,
            None => TrustedDomainSet::bundled()?,
        };

        Ok(Self {
            news_api_key,
            news_api_url: get("NEWS_API_URL").unwrap_or_else(|| DEFAULT_NEWS_API_URL.to_string()),
            twitter_api_url: get("TWITTER_API_URL").unwrap_or_else(|| DEFAULT_TWITTER_API_URL.to_string()),
            translate_api_url: get("TRANSLATE_API_URL").unwrap_or_else(|| DEFAULT_TRANSLATE_API_URL.to_string()),
            credentials,
            monitored_account: get("TWITTER_MONITORED_ACCOUNT").map(|a| a.trim_start_matches('@').to_string()),
            target_lang: get("TRANSLATE_TARGET_LANG").unwrap_or_else(|| DEFAULT_TARGET_LANG.to_string()),
            ticker_marker,
            poll_interval: Duration::from_secs(parse_secs(
                "POLL_INTERVAL_SECS",
                get("POLL_INTERVAL_SECS"),
                DEFAULT_POLL_INTERVAL_SECS,
            )?),
            http_timeout: Duration::from_secs(parse_secs(
                "HTTP_TIMEOUT_SECS",
                get("HTTP_TIMEOUT_SECS"),
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            state_dir: PathBuf::from(get("STATE_DIR").unwrap_or_else(|| DEFAULT_STATE_DIR.to_string())),
            trusted_domains,
        })
    }

    pub fn cycle_settings(&self) -> CycleSettings {
        CycleSettings {
            target_lang: self.target_lang.clone(),
            ticker_marker: self.ticker_marker,
        }
    }
}

fn parse_secs(field: &str, raw: Option<String>, default: u64) -> CuratorResult<u64> {
    match raw {
        None => Ok(default),
        Some(raw) => match raw.parse::<u64>() {
            Ok(0) => Err(CuratorError::config(field, "must be greater than zero")),
            Ok(secs) => Ok(secs),
            Err(e) => Err(CuratorError::config(field, format!("'{raw}' is not a number: {e}"))),
        },
    }
}
