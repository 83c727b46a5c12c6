//! Public fetch surface: resolve the policy once, then drive the loop.

use std::collections::HashMap;
use std::time::Duration;

use url::Url;

use crate::config::{self, RetryDefaults};
use crate::error::FetchError;
use crate::retry::{self, RetrySetting};
use crate::transport::{
    CurlTransport, Transport, TransportError, TransportRequest, TransportResponse,
};

/// Options for one retrying fetch.
///
/// `retry` disables or tunes the retry behavior. `timeout`, when set, is the
/// caller's own per-request deadline, enforced by the transport; the retry
/// loop then applies no socket timeout of its own.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
    pub retry: RetrySetting,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
            retry: RetrySetting::default(),
        }
    }
}

/// Fetches `url` with the default libcurl transport.
pub async fn retrying_fetch(
    url: &str,
    options: FetchOptions,
) -> Result<TransportResponse, FetchError> {
    let transport = CurlTransport::new();
    retrying_fetch_with(&transport, url, options).await
}

/// Fetches `url` over a caller-supplied transport.
///
/// The environment (retry defaults and the external deadline) is read once,
/// here; the resolved policy is fixed for the duration of the call. A
/// malformed URL or invalid retry option fails before any attempt.
pub async fn retrying_fetch_with(
    transport: &dyn Transport,
    url: &str,
    options: FetchOptions,
) -> Result<TransportResponse, FetchError> {
    let parsed = Url::parse(url).map_err(|e| {
        FetchError::Transport(TransportError::InvalidUrl {
            message: format!("{}: {}", url, e),
        })
    })?;

    let defaults = RetryDefaults::from_env();
    let deadline = config::external_deadline_ms();
    let resolved = retry::resolve(options.retry, &defaults, deadline)?;

    let request = TransportRequest {
        url: String::from(parsed),
        method: options.method,
        headers: options.headers,
        body: options.body,
        timeout: options.timeout,
    };
    retry::run_with_retry(transport, &request, resolved).await
}
