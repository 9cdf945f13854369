//! Environment-variable switches for the harness.
//!
//! All knobs live here so the rest of the workspace never reads
//! `std::env` directly for harness behavior.

use std::{env, path::PathBuf, time::Duration};

/// Keep node staging directories after a run instead of cleaning them up.
pub const KEEP_STAGING_ENV: &str = "NET_HARNESS_KEEP_STAGING";
/// Multiply every harness timeout by this factor (slow CI machines).
pub const SLOW_FACTOR_ENV: &str = "NET_HARNESS_SLOW_FACTOR";
/// Absolute path of the node binary, overriding `PATH` lookup.
pub const NODE_BIN_ENV: &str = "NET_HARNESS_NODE_BIN";

#[must_use]
pub fn keep_staging() -> bool {
    flag_enabled(KEEP_STAGING_ENV)
}

#[must_use]
pub fn node_binary_override() -> Option<PathBuf> {
    env::var_os(NODE_BIN_ENV).map(PathBuf::from)
}

/// Timeout multiplier read from [`SLOW_FACTOR_ENV`]; `1` when unset or
/// unparsable.
#[must_use]
pub fn slow_test_factor() -> u32 {
    env::var(SLOW_FACTOR_ENV)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .filter(|factor| *factor > 0)
        .unwrap_or(1)
}

#[must_use]
pub fn adjust_timeout(timeout: Duration) -> Duration {
    timeout * slow_test_factor()
}

fn flag_enabled(key: &str) -> bool {
    env::var(key)
        .map(|raw| matches!(raw.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
