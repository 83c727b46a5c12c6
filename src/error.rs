//! Failure taxonomy for retrying fetches.
//!
//! Configuration errors surface before any attempt. Per-attempt cancellation
//! and overall-budget exhaustion share the single "network timeout" identity;
//! any other transport error keeps its original identity.

use thiserror::Error;

use crate::transport::TransportError;

/// Invalid retry options. One variant per field so each failure carries its
/// own message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("`retry_max_duration` must not be a negative integer")]
    NegativeMaxDuration,
    #[error("`retry_initial_delay` must not be a negative integer")]
    NegativeInitialDelay,
    #[error("`retry_backoff` must be a positive integer >= 1")]
    InvalidBackoff,
    #[error("`socket_timeout` must not be a negative integer")]
    NegativeSocketTimeout,
}

/// Terminal failure of one retrying fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Rejected before any attempt was made.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The allotted time ran out: either a socket timeout cancelled the last
    /// attempt, or the overall budget was exhausted.
    #[error("network timeout at: {url}")]
    Timeout { url: String },
    /// The transport failed and the error predicate declined to retry.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl FetchError {
    /// Machine-readable failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Config(_) => "config",
            FetchError::Timeout { .. } => "request-timeout",
            FetchError::Transport(_) => "transport",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_messages_name_the_field() {
        assert_eq!(
            ConfigError::NegativeMaxDuration.to_string(),
            "`retry_max_duration` must not be a negative integer"
        );
        assert_eq!(
            ConfigError::NegativeInitialDelay.to_string(),
            "`retry_initial_delay` must not be a negative integer"
        );
        assert_eq!(
            ConfigError::InvalidBackoff.to_string(),
            "`retry_backoff` must be a positive integer >= 1"
        );
        assert_eq!(
            ConfigError::NegativeSocketTimeout.to_string(),
            "`socket_timeout` must not be a negative integer"
        );
    }

    #[test]
    fn timeout_carries_the_url() {
        let e = FetchError::Timeout {
            url: "http://example.com/data".to_string(),
        };
        assert_eq!(e.to_string(), "network timeout at: http://example.com/data");
        assert_eq!(e.kind(), "request-timeout");
    }

    #[test]
    fn kinds_are_machine_readable() {
        assert_eq!(FetchError::Config(ConfigError::InvalidBackoff).kind(), "config");
        let transport = FetchError::Transport(TransportError::Other {
            message: "boom".to_string(),
        });
        assert_eq!(transport.kind(), "transport");
    }
}
