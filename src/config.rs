//! Environment-sourced configuration.
//!
//! Values are read at call time and never cached, so tests and long-lived
//! callers observe the current process environment.

use std::env;
use std::time::Duration;

/// Task metadata endpoint (v4) injected by the ECS agent.
/// See: https://docs.aws.amazon.com/AmazonECS/latest/developerguide/task-metadata-endpoint-v4.html
pub const METADATA_URI_ENV: &str = "ECS_CONTAINER_METADATA_URI_V4";

/// Optional override for the metadata fetch timeout, as a duration string.
pub const METADATA_TIMEOUT_ENV: &str = "ECS_CONTAINER_METADATA_URI_V4_TIMEOUT";

/// Log filter for this binary (EnvFilter syntax); falls back to RUST_LOG.
pub const LOG_ENV: &str = "ECS_TASK_HELPER_LOG";

pub const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(1);

/// Metadata endpoint URL; None when unset or empty.
pub fn metadata_endpoint(var: &str) -> Option<String> {
    env::var(var).ok().filter(|s| !s.is_empty())
}

/// Fetch timeout from `ECS_CONTAINER_METADATA_URI_V4_TIMEOUT`, or the default.
///
/// An unparsable value is logged and ignored; it never aborts startup.
pub fn metadata_timeout() -> Duration {
    metadata_timeout_from(env::var(METADATA_TIMEOUT_ENV).ok().as_deref())
}

fn metadata_timeout_from(raw: Option<&str>) -> Duration {
    let Some(v) = raw.filter(|s| !s.is_empty()) else {
        return DEFAULT_METADATA_TIMEOUT;
    };
    match parse_duration_arg(v) {
        Ok(d) => d,
        Err(_) => {
            tracing::warn!(
                value = v,
                default = %humantime::format_duration(DEFAULT_METADATA_TIMEOUT),
                "invalid {METADATA_TIMEOUT_ENV}, using default"
            );
            DEFAULT_METADATA_TIMEOUT
        }
    }
}

/// Parse a human duration such as `5s`, `250ms` or `1m 30s`.
pub fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim()).map_err(|e| format!("invalid duration '{s}': {e}"))
}
