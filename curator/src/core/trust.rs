//! Trusted-source filtering by registrable domain

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use url::{Host, Url};

use crate::error::{CuratorError, CuratorResult};

/// Allowlist shipped with the binary
const BUNDLED_DOMAINS: &str = include_str!("../../data/domains.json");

#[derive(Deserialize)]
struct DomainsFile {
    domains: Vec<String>,
}

/// Immutable set of trusted registrable domains, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct TrustedDomainSet {
    domains: Arc<HashSet<String>>,
}

impl TrustedDomainSet {
    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: Arc::new(domains.into_iter().map(Into::into).collect()),
        }
    }

    /// Parse a `{"domains": [...]}` document
    pub fn from_json(raw: &str) -> CuratorResult<Self> {
        let file: DomainsFile = serde_json::from_str(raw)?;
        if file.domains.is_empty() {
            return Err(CuratorError::config("trusted_domains", "domain list is empty"));
        }
        Ok(Self::from_domains(file.domains))
    }

    /// The dataset compiled into the binary
    pub fn bundled() -> CuratorResult<Self> {
        Self::from_json(BUNDLED_DOMAINS)
    }

    pub fn load(path: &Path) -> CuratorResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CuratorError::config("trusted_domains", format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// Reduce a URL or bare host to its registrable domain
/// (`https://news.example.co.uk/a` -> `example.co.uk`).
///
/// Only ICANN suffixes bound the domain. Privately registered suffixes such
/// as `blogspot.com` or `github.io` count as ordinary domains, so
/// `alice.blogspot.com` reduces to `blogspot.com`.
///
/// Returns `None` for anything that has no registrable domain: malformed
/// input, IP addresses, bare public suffixes.
pub fn registrable_domain(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    // Feeds report sources as bare hosts; give those a scheme so they parse.
    let parsed = if input.contains("://") {
        Url::parse(input)
    } else {
        Url::parse(&format!("https://{input}"))
    }
    .ok()?;

    let host = match parsed.host()? {
        Host::Domain(domain) => domain.trim_end_matches('.'),
        Host::Ipv4(_) | Host::Ipv6(_) => return None,
    };

    icann_registrable(host)
}

/// Longest tail of `host` that is an ICANN (or unlisted) suffix, plus one label
fn icann_registrable(host: &str) -> Option<String> {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.iter().any(|label| label.is_empty()) {
        return None;
    }

    for start in 0..labels.len() {
        let tail = labels[start..].join(".");
        let Some(suffix) = psl::suffix(tail.as_bytes()) else {
            continue;
        };
        if suffix.as_bytes() != tail.as_bytes() || suffix.typ() == Some(psl::Type::Private) {
            continue;
        }
        return match start {
            0 => None,
            _ => Some(labels[start - 1..].join(".")),
        };
    }
    None
}

/// Decides whether a source belongs to the trusted allowlist
#[derive(Debug, Clone)]
pub struct DomainTrustFilter {
    trusted: TrustedDomainSet,
}

impl DomainTrustFilter {
    pub fn new(trusted: TrustedDomainSet) -> Self {
        Self { trusted }
    }

    /// True iff the input's registrable domain is in the allowlist.
    /// Malformed input is untrusted, never an error.
    pub fn is_trusted(&self, input: &str) -> bool {
        registrable_domain(input)
            .map(|domain| self.trusted.contains(&domain))
            .unwrap_or(false)
    }
}
