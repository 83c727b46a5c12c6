//! Per-call retry policy: validation, defaults, and the two clamps.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::options::{
    retry_on_server_error, retry_on_system_error, ErrorPredicate, ResponsePredicate, RetryOptions,
    RetrySetting,
};
use crate::config::{self, RetryDefaults};
use crate::error::ConfigError;

/// Resolved retry behavior for one call.
pub enum ResolvedRetry {
    /// Exactly one attempt; outcome returned or raised verbatim.
    Disabled,
    Policy(RetryPolicy),
}

/// Per-call retry state.
///
/// Everything is fixed at resolution except `current_delay`, which grows by
/// `backoff` after each unsuccessful round. A policy belongs to exactly one
/// call's loop and is never shared.
pub struct RetryPolicy {
    /// Anchors elapsed-time computation, on the runtime clock.
    pub(crate) start: Instant,
    pub(crate) max_duration: Duration,
    pub(crate) current_delay: Duration,
    pub(crate) backoff: u32,
    pub(crate) socket_timeout: Duration,
    pub(crate) response_predicate: Arc<dyn ResponsePredicate>,
    pub(crate) error_predicate: Arc<dyn ErrorPredicate>,
}

impl RetryPolicy {
    /// Time left in the overall budget.
    pub(crate) fn remaining(&self) -> Duration {
        self.max_duration.saturating_sub(self.start.elapsed())
    }

    /// Grows the next-retry delay after an unsuccessful round.
    pub(crate) fn advance(&mut self) {
        self.current_delay = self.current_delay.saturating_mul(self.backoff);
    }
}

/// Resolves user options, environment defaults, and the external deadline
/// into the retry behavior for one call.
///
/// Priority is ascending: hard defaults, environment overrides, explicit
/// options. Validation failures surface here, before any network I/O.
pub fn resolve(
    setting: RetrySetting,
    defaults: &RetryDefaults,
    deadline_ms: Option<u64>,
) -> Result<ResolvedRetry, ConfigError> {
    let options = match setting {
        RetrySetting::Disabled => return Ok(ResolvedRetry::Disabled),
        RetrySetting::Enabled(options) => options,
    };

    let mut max_duration = field_ms(
        options.retry_max_duration,
        defaults.max_duration_ms,
        ConfigError::NegativeMaxDuration,
    )?;
    let initial_delay = field_ms(
        options.retry_initial_delay,
        defaults.initial_delay_ms,
        ConfigError::NegativeInitialDelay,
    )?;
    let mut socket_timeout = field_ms(
        options.socket_timeout,
        defaults.socket_timeout_ms,
        ConfigError::NegativeSocketTimeout,
    )?;
    let backoff = match options.retry_backoff {
        Some(v) if v < 1 => return Err(ConfigError::InvalidBackoff),
        Some(v) => u32::try_from(v).unwrap_or(u32::MAX),
        None => u32::try_from(defaults.backoff).unwrap_or(u32::MAX),
    };
    let force_socket_timeout = options
        .force_socket_timeout
        .unwrap_or(defaults.force_socket_timeout);

    // An external deadline can only shrink the budget, never extend it.
    if let Some(deadline) = deadline_ms {
        let until_deadline = deadline.saturating_sub(config::now_epoch_ms());
        if until_deadline < max_duration {
            tracing::debug!(
                requested_ms = max_duration,
                remaining_ms = until_deadline,
                "retry budget clamped to external deadline"
            );
            max_duration = until_deadline;
        }
    }

    // A socket timeout that swallows the whole budget leaves no room for a
    // retry; halve it unless the caller insists.
    if socket_timeout >= max_duration && !force_socket_timeout {
        socket_timeout = max_duration / 2;
        tracing::debug!(
            socket_timeout_ms = socket_timeout,
            "socket timeout clamped below retry budget"
        );
    }

    Ok(ResolvedRetry::Policy(RetryPolicy {
        start: Instant::now(),
        max_duration: Duration::from_millis(max_duration),
        current_delay: Duration::from_millis(initial_delay),
        backoff,
        socket_timeout: Duration::from_millis(socket_timeout),
        response_predicate: options
            .response_predicate
            .unwrap_or_else(|| Arc::new(retry_on_server_error)),
        error_predicate: options
            .error_predicate
            .unwrap_or_else(|| Arc::new(retry_on_system_error)),
    }))
}

fn field_ms(value: Option<i64>, default: u64, negative: ConfigError) -> Result<u64, ConfigError> {
    match value {
        Some(v) if v < 0 => Err(negative),
        Some(v) => Ok(v as u64),
        None => Ok(default),
    }
}
