//! Diagnostic logging to stderr via tracing-subscriber.
//!
//! Stdout belongs to command output (`metadata`, `check` bodies, the exec'd
//! program), so the fmt layer always writes to stderr.

use std::env;

use anyhow::{anyhow, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LOG_ENV;

const DEFAULT_FILTER: &str = "info";

/// Filter directive: `ECS_TASK_HELPER_LOG`, then `RUST_LOG`, then `info`.
fn filter_directive() -> String {
    [LOG_ENV, "RUST_LOG"]
        .iter()
        .filter_map(|k| env::var(k).ok())
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init() -> Result<()> {
    let directive = filter_directive();
    let (filter, rejected) = match EnvFilter::try_new(&directive) {
        Ok(f) => (f, None),
        Err(e) => (EnvFilter::new(DEFAULT_FILTER), Some(e)),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("logging init skipped: {e}"))?;

    if let Some(e) = rejected {
        tracing::warn!(directive = %directive, error = %e, "invalid log filter, using {DEFAULT_FILTER}");
    }
    Ok(())
}
