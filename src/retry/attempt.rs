//! One attempt: a transport call bounded by the per-attempt socket timeout.

use std::time::Duration;

use thiserror::Error;

use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// Error from a single attempt, as seen by error predicates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// The per-attempt socket timeout cancelled the transfer.
    #[error("attempt cancelled after {after:?}")]
    Cancelled { after: Duration },
    /// The transport itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// What one attempt produced. Exactly one side is populated.
#[derive(Debug)]
pub enum AttemptOutcome {
    Response(TransportResponse),
    Error(AttemptError),
}

/// Runs one transport call under the socket timeout.
///
/// Skipped entirely when the request carries its own `timeout`; the
/// transport enforces that itself. The timeout future is scoped to this
/// call, so it is released on every exit path and a stale timer can never
/// cancel a later attempt. Responses produced under the timeout are
/// annotated with it before evaluation.
pub(crate) async fn execute(
    transport: &dyn Transport,
    request: &TransportRequest,
    socket_timeout: Duration,
) -> AttemptOutcome {
    if request.timeout.is_some() {
        return match transport.send(request).await {
            Ok(response) => AttemptOutcome::Response(response),
            Err(e) => AttemptOutcome::Error(AttemptError::Transport(e)),
        };
    }

    match tokio::time::timeout(socket_timeout, transport.send(request)).await {
        Ok(Ok(mut response)) => {
            response.timeout = Some(socket_timeout);
            AttemptOutcome::Response(response)
        }
        Ok(Err(e)) => AttemptOutcome::Error(AttemptError::Transport(e)),
        Err(_) => AttemptOutcome::Error(AttemptError::Cancelled {
            after: socket_timeout,
        }),
    }
}
