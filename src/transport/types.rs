//! Request/response value types and the transport error taxonomy.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;

/// One HTTP request handed to the transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: String,
    /// HTTP method name, e.g. `GET`.
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
    /// Caller-managed per-request deadline. When set, the transport enforces
    /// it and the retry loop applies no socket timeout of its own.
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// A plain GET for `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }
}

/// Response returned by the transport.
///
/// Header names are stored lowercased.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Socket timeout that was in effect for the attempt that produced this
    /// response, when the retry loop enforced one.
    pub timeout: Option<Duration>,
}

/// Transport failure classes.
///
/// [`TimedOut`][TransportError::TimedOut], [`Connection`][TransportError::Connection]
/// and [`Io`][TransportError::Io] are system-level: the connection or
/// transfer itself failed, and another attempt may succeed. The rest are
/// final.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport's own transfer timeout expired.
    #[error("transfer timed out: {message}")]
    TimedOut { message: String },
    /// DNS resolution or connection establishment failed.
    #[error("connection failed: {message}")]
    Connection { message: String },
    /// The transfer broke mid-flight (send/receive failure, empty reply).
    #[error("transfer failed: {message}")]
    Io { message: String },
    /// The request URL is not usable.
    #[error("invalid URL: {message}")]
    InvalidUrl { message: String },
    /// Anything else the transport reports.
    #[error("{message}")]
    Other { message: String },
}

impl TransportError {
    /// True for error classes where another attempt can plausibly succeed.
    pub fn is_system(&self) -> bool {
        matches!(
            self,
            TransportError::TimedOut { .. }
                | TransportError::Connection { .. }
                | TransportError::Io { .. }
        )
    }
}

/// Black-box HTTP operation: sends one request, yields a response or a
/// transport error. Implementations must be usable from `&self` so one
/// transport can serve many concurrent calls.
pub trait Transport: Send + Sync {
    fn send<'a>(
        &'a self,
        request: &'a TransportRequest,
    ) -> BoxFuture<'a, Result<TransportResponse, TransportError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_errors_are_the_transient_classes() {
        let timed_out = TransportError::TimedOut {
            message: "after 30s".to_string(),
        };
        let connection = TransportError::Connection {
            message: "refused".to_string(),
        };
        let io = TransportError::Io {
            message: "connection reset".to_string(),
        };
        assert!(timed_out.is_system());
        assert!(connection.is_system());
        assert!(io.is_system());

        let invalid = TransportError::InvalidUrl {
            message: "no scheme".to_string(),
        };
        let other = TransportError::Other {
            message: "unsupported protocol".to_string(),
        };
        assert!(!invalid.is_system());
        assert!(!other.is_system());
    }

    #[test]
    fn get_request_defaults() {
        let request = TransportRequest::get("http://example.com/");
        assert_eq!(request.method, "GET");
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
        assert!(request.timeout.is_none());
    }
}
