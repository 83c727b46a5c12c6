//! User-facing retry options and decision predicates.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use super::attempt::AttemptError;
use crate::transport::TransportResponse;

/// Decides whether a returned response should be retried.
///
/// Plain `Fn(&TransportResponse) -> bool` closures implement this. An
/// implementation may suspend before yielding its verdict; the decision
/// engine awaits it either way.
pub trait ResponsePredicate: Send + Sync {
    fn evaluate<'a>(&'a self, response: &'a TransportResponse) -> BoxFuture<'a, bool>;
}

impl<F> ResponsePredicate for F
where
    F: Fn(&TransportResponse) -> bool + Send + Sync,
{
    fn evaluate<'a>(&'a self, response: &'a TransportResponse) -> BoxFuture<'a, bool> {
        Box::pin(std::future::ready(self(response)))
    }
}

/// Decides whether a failed attempt should be retried.
pub trait ErrorPredicate: Send + Sync {
    fn evaluate<'a>(&'a self, error: &'a AttemptError) -> BoxFuture<'a, bool>;
}

impl<F> ErrorPredicate for F
where
    F: Fn(&AttemptError) -> bool + Send + Sync,
{
    fn evaluate<'a>(&'a self, error: &'a AttemptError) -> BoxFuture<'a, bool> {
        Box::pin(std::future::ready(self(error)))
    }
}

/// Default response rule: retry server errors, accept everything else.
pub fn retry_on_server_error(response: &TransportResponse) -> bool {
    response.status >= 500
}

/// Default error rule: retry socket-timeout cancellations and system-level
/// transport failures; anything else is final.
pub fn retry_on_system_error(error: &AttemptError) -> bool {
    match error {
        AttemptError::Cancelled { .. } => true,
        AttemptError::Transport(e) => e.is_system(),
    }
}

/// Retry tuning for one call.
///
/// Every field is optional; omitted fields fall back to environment-derived
/// defaults. Durations are signed milliseconds so that negative inputs are
/// representable and rejected at policy resolution with a per-field message.
#[derive(Clone, Default)]
pub struct RetryOptions {
    /// Total budget across all attempts and waits, in milliseconds.
    pub retry_max_duration: Option<i64>,
    /// Delay before the first retry, in milliseconds.
    pub retry_initial_delay: Option<i64>,
    /// Backoff multiplier, an integer >= 1.
    pub retry_backoff: Option<i64>,
    /// Per-attempt cancellation deadline, in milliseconds.
    pub socket_timeout: Option<i64>,
    /// Keep `socket_timeout` even when it meets or exceeds the budget.
    pub force_socket_timeout: Option<bool>,
    /// Replaces the default response rule.
    pub response_predicate: Option<Arc<dyn ResponsePredicate>>,
    /// Replaces the default error rule.
    pub error_predicate: Option<Arc<dyn ErrorPredicate>>,
}

impl fmt::Debug for RetryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("retry_max_duration", &self.retry_max_duration)
            .field("retry_initial_delay", &self.retry_initial_delay)
            .field("retry_backoff", &self.retry_backoff)
            .field("socket_timeout", &self.socket_timeout)
            .field("force_socket_timeout", &self.force_socket_timeout)
            .field("response_predicate", &self.response_predicate.is_some())
            .field("error_predicate", &self.error_predicate.is_some())
            .finish()
    }
}

/// Whether a call retries at all.
#[derive(Debug, Clone)]
pub enum RetrySetting {
    /// Exactly one attempt; the outcome is returned or raised verbatim.
    Disabled,
    /// Retry with the given tuning.
    Enabled(RetryOptions),
}

impl Default for RetrySetting {
    fn default() -> Self {
        RetrySetting::Enabled(RetryOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use std::collections::HashMap;

    fn response(status: u16) -> TransportResponse {
        TransportResponse {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
            timeout: None,
        }
    }

    #[tokio::test]
    async fn default_response_rule_retries_server_errors_only() {
        assert!(retry_on_server_error(&response(500)));
        assert!(retry_on_server_error(&response(503)));
        assert!(!retry_on_server_error(&response(200)));
        assert!(!retry_on_server_error(&response(404)));
        assert!(!retry_on_server_error(&response(499)));

        // The same rule through the predicate seam.
        let predicate: Arc<dyn ResponsePredicate> = Arc::new(retry_on_server_error);
        assert!(predicate.evaluate(&response(502)).await);
        assert!(!predicate.evaluate(&response(418)).await);
    }

    #[tokio::test]
    async fn default_error_rule_retries_cancellations_and_system_failures() {
        let cancelled = AttemptError::Cancelled {
            after: std::time::Duration::from_secs(30),
        };
        assert!(retry_on_system_error(&cancelled));

        let reset = AttemptError::Transport(TransportError::Io {
            message: "connection reset".to_string(),
        });
        assert!(retry_on_system_error(&reset));

        let bad_url = AttemptError::Transport(TransportError::InvalidUrl {
            message: "no scheme".to_string(),
        });
        assert!(!retry_on_system_error(&bad_url));
    }

    #[tokio::test]
    async fn closures_are_predicates() {
        let predicate: Arc<dyn ResponsePredicate> =
            Arc::new(|response: &TransportResponse| response.status == 429);
        assert!(predicate.evaluate(&response(429)).await);
        assert!(!predicate.evaluate(&response(500)).await);
    }
}
