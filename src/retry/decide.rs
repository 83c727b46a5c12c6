//! Retry decision: the remaining-budget gate, then the matching predicate.

use std::time::Duration;

use super::attempt::AttemptOutcome;
use super::policy::RetryPolicy;

/// Decides whether the loop should retry after an attempt.
///
/// If less budget remains than the upcoming wait, the answer is no,
/// unconditionally: waiting would spend time that cannot fund another
/// attempt. Otherwise the outcome's predicate decides, and may suspend
/// before doing so.
pub(crate) async fn should_retry(
    policy: &RetryPolicy,
    outcome: &AttemptOutcome,
    next_wait: Duration,
) -> bool {
    if policy.remaining() < next_wait {
        return false;
    }
    match outcome {
        AttemptOutcome::Response(response) => policy.response_predicate.evaluate(response).await,
        AttemptOutcome::Error(error) => policy.error_predicate.evaluate(error).await,
    }
}
