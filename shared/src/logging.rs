//! Shared logging utilities for consistent tracing across the agent

use crate::types::Component;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

/// Build the filter directive used for stdout tracing
pub fn filter_directive(log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or("info");
    format!("curator={base_level},shared={base_level},reqwest=warn,hyper=warn")
}

/// Initialize tracing subscriber with an optional log level
///
/// `RUST_LOG` takes precedence over the computed directive when set.
pub fn init_tracing(log_level: Option<&str>) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level)));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for component-aware info logging
#[macro_export]
macro_rules! component_info {
    ($component:expr, $($arg:tt)*) => {
        tracing::info!(
            component = %$component,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for component-aware warning logging
#[macro_export]
macro_rules! component_warn {
    ($component:expr, $($arg:tt)*) => {
        tracing::warn!(
            component = %$component,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for component-aware error logging
#[macro_export]
macro_rules! component_error {
    ($component:expr, $($arg:tt)*) => {
        tracing::error!(
            component = %$component,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for component-aware debug logging
#[macro_export]
macro_rules! component_debug {
    ($component:expr, $($arg:tt)*) => {
        tracing::debug!(
            component = %$component,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(component: Component, details: &str) {
    info!(
        component = %component,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(component: Component, reason: &str) {
    info!(
        component = %component,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(component: Component, context: &str, error: &dyn std::fmt::Display) {
    error!(
        component = %component,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for a side effect that happened but was not
/// recorded, so the next cycle will repeat it
pub fn log_unrecorded(component: Component, action: &str, error: &dyn std::fmt::Display) {
    warn!(
        component = %component,
        timestamp = format_timestamp(),
        error = %error,
        "⚠️ {} succeeded but was not recorded; it will be repeated next cycle",
        action
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(component: Component, message: &str) {
    info!(
        component = %component,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_defaults_to_info() {
        assert_eq!(
            filter_directive(None),
            "curator=info,shared=info,reqwest=warn,hyper=warn"
        );
    }

    #[test]
    fn test_filter_directive_uses_level() {
        assert!(filter_directive(Some("debug")).starts_with("curator=debug,shared=debug"));
    }

    #[test]
    fn test_format_timestamp_shape() {
        let ts = format_timestamp();
        // HH:MM:SS.mmm
        assert_eq!(ts.len(), 12);
        assert_eq!(&ts[2..3], ":");
        assert_eq!(&ts[8..9], ".");
    }
}
