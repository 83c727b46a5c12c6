//! Retry orchestration: policy resolution, bounded attempts, backoff.
//!
//! One call resolves its policy exactly once (explicit options over
//! environment defaults, clamped by any external deadline), then runs
//! attempts under a per-attempt socket timeout until a predicate declines,
//! the response is final, or the time budget runs out.

mod attempt;
mod decide;
mod options;
mod policy;
mod run;

pub use attempt::{AttemptError, AttemptOutcome};
pub use options::{
    retry_on_server_error, retry_on_system_error, ErrorPredicate, ResponsePredicate, RetryOptions,
    RetrySetting,
};
pub use policy::{resolve, ResolvedRetry, RetryPolicy};
pub use run::run_with_retry;
