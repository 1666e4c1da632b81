//! Service-specific tests
//!
//! HTTP clients run against a local wiremock server; the state store runs in
//! a temporary directory.

#[cfg(test)]
mod state_store;

// Common test utilities for services
#[cfg(test)]
pub mod common {
    use std::time::Duration;

    use shared::{Session, SessionAuth};

    /// HTTP timeout used by every client under test
    pub const TEST_HTTP_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn bearer_session(user_id: &str) -> Session {
        Session::new(user_id, SessionAuth::Bearer("test-token".to_string()))
    }
}
