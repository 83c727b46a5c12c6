//! Black-box HTTP transport seam.
//!
//! The retry loop drives a [`Transport`]: one request in, one response or
//! transport error out. Everything HTTP beyond that (redirects, TLS,
//! connection reuse) belongs to the implementation. The default
//! implementation runs libcurl transfers on the blocking pool.

pub mod curl;
mod types;

pub use self::curl::CurlTransport;
pub use types::{Transport, TransportError, TransportRequest, TransportResponse};
