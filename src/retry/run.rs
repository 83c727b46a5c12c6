//! The retry loop: bounded attempts, backoff waits, terminal mapping.

use std::time::Duration;

use rand::Rng;

use super::attempt::{self, AttemptError, AttemptOutcome};
use super::decide;
use super::policy::ResolvedRetry;
use crate::error::FetchError;
use crate::transport::{Transport, TransportRequest, TransportResponse};

/// Upper bound (exclusive) on the random addition to each wait. Keeps
/// independent callers hitting the same origin from retrying in lockstep.
const JITTER_MAX_MS: u64 = 100;

fn jitter() -> Duration {
    Duration::from_millis(rand::rng().random_range(0..JITTER_MAX_MS))
}

/// Drives one logical request to a terminal outcome.
///
/// A disabled policy performs exactly one attempt and propagates whatever
/// the transport produced, verbatim. Otherwise attempts run under the
/// socket timeout until a predicate declines, the response is final, or the
/// time budget runs out. Retries are strictly sequential; the loop suspends
/// only while awaiting an attempt or sleeping out a backoff wait.
pub async fn run_with_retry(
    transport: &dyn Transport,
    request: &TransportRequest,
    resolved: ResolvedRetry,
) -> Result<TransportResponse, FetchError> {
    let mut policy = match resolved {
        ResolvedRetry::Disabled => {
            return transport.send(request).await.map_err(FetchError::Transport);
        }
        ResolvedRetry::Policy(policy) => policy,
    };

    let mut attempt_count = 0u32;
    while !policy.remaining().is_zero() {
        attempt_count += 1;
        let wait = policy.current_delay + jitter();

        let outcome = attempt::execute(transport, request, policy.socket_timeout).await;
        if !decide::should_retry(&policy, &outcome, wait).await {
            return match outcome {
                AttemptOutcome::Response(response) => Ok(response),
                AttemptOutcome::Error(AttemptError::Cancelled { .. }) => Err(FetchError::Timeout {
                    url: request.url.clone(),
                }),
                AttemptOutcome::Error(AttemptError::Transport(e)) => {
                    Err(FetchError::Transport(e))
                }
            };
        }

        tracing::warn!(
            attempt = attempt_count,
            wait_ms = wait.as_millis() as u64,
            url = %request.url,
            "attempt unsuccessful, retrying after backoff"
        );
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        policy.advance();
    }

    // Budget exhausted without a terminal outcome: same failure identity as
    // a socket-timeout cancellation.
    Err(FetchError::Timeout {
        url: request.url.clone(),
    })
}
