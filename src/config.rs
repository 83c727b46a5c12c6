//! Environment-derived retry defaults and the external deadline clock.
//!
//! Both are read once per call at policy-resolution time and never re-read
//! mid-call, so a call observes one consistent configuration.

use std::time::{SystemTime, UNIX_EPOCH};

/// Override for the total retry budget, in milliseconds.
pub const ENV_MAX_DURATION: &str = "FETCH_RETRY_MAX_DURATION";
/// Override for the delay before the first retry, in milliseconds.
pub const ENV_INITIAL_DELAY: &str = "FETCH_RETRY_INITIAL_DELAY";
/// Override for the backoff multiplier.
pub const ENV_BACKOFF: &str = "FETCH_RETRY_BACKOFF";
/// Override for the per-attempt socket timeout, in milliseconds.
pub const ENV_SOCKET_TIMEOUT: &str = "FETCH_RETRY_SOCKET_TIMEOUT";
/// Set to `true`/`1` to keep the socket timeout even when it exceeds the
/// retry budget.
pub const ENV_FORCE_SOCKET_TIMEOUT: &str = "FETCH_RETRY_FORCE_SOCKET_TIMEOUT";
/// Externally imposed execution deadline, as absolute milliseconds since the
/// Unix epoch (e.g. a serverless runtime's cutoff).
pub const ENV_DEADLINE: &str = "FETCH_RETRY_DEADLINE";

/// Process-wide retry defaults, each overridable via environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryDefaults {
    pub max_duration_ms: u64,
    pub initial_delay_ms: u64,
    pub backoff: u64,
    pub socket_timeout_ms: u64,
    pub force_socket_timeout: bool,
}

impl Default for RetryDefaults {
    fn default() -> Self {
        Self {
            max_duration_ms: 60_000,
            initial_delay_ms: 100,
            backoff: 2,
            socket_timeout_ms: 30_000,
            force_socket_timeout: false,
        }
    }
}

impl RetryDefaults {
    /// Defaults with per-field environment overrides applied.
    ///
    /// Missing or unparsable values fall back to the hard default for that
    /// field only.
    pub fn from_env() -> Self {
        let hard = Self::default();
        Self {
            max_duration_ms: env_u64(ENV_MAX_DURATION).unwrap_or(hard.max_duration_ms),
            initial_delay_ms: env_u64(ENV_INITIAL_DELAY).unwrap_or(hard.initial_delay_ms),
            backoff: env_u64(ENV_BACKOFF).unwrap_or(hard.backoff),
            socket_timeout_ms: env_u64(ENV_SOCKET_TIMEOUT).unwrap_or(hard.socket_timeout_ms),
            force_socket_timeout: env_flag(ENV_FORCE_SOCKET_TIMEOUT)
                .unwrap_or(hard.force_socket_timeout),
        }
    }
}

/// External execution deadline, when the environment provides one.
pub fn external_deadline_ms() -> Option<u64> {
    env_u64(ENV_DEADLINE)
}

/// Wall-clock milliseconds since the Unix epoch.
pub(crate) fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse::<u64>().ok())
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| v == "true" || v == "1")
}
