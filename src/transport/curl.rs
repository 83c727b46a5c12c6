//! libcurl-backed transport.
//!
//! Each attempt runs one blocking transfer on the runtime's blocking pool.
//! Status, response headers, and body are collected in memory; libcurl error
//! classes are mapped onto [`TransportError`].

use std::collections::HashMap;
use std::str;

use curl::easy::{Easy, List};
use futures::future::BoxFuture;

use super::{Transport, TransportError, TransportRequest, TransportResponse};

/// Default transport: one libcurl easy handle per attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlTransport;

impl CurlTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for CurlTransport {
    fn send<'a>(
        &'a self,
        request: &'a TransportRequest,
    ) -> BoxFuture<'a, Result<TransportResponse, TransportError>> {
        let request = request.clone();
        Box::pin(async move {
            let url = request.url.clone();
            let result = tokio::task::spawn_blocking(move || perform(&request))
                .await
                .map_err(|e| TransportError::Other {
                    message: format!("transfer task failed: {}", e),
                })?;
            if let Err(ref e) = result {
                tracing::debug!(url = %url, error = %e, "transfer failed");
            }
            result
        })
    }
}

/// Runs one blocking transfer. Call from `spawn_blocking` when used from
/// async code.
fn perform(request: &TransportRequest) -> Result<TransportResponse, TransportError> {
    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = Easy::new();
    easy.url(&request.url).map_err(classify_curl_error)?;
    if request.method.eq_ignore_ascii_case("HEAD") {
        easy.nobody(true).map_err(classify_curl_error)?;
    } else if !request.method.eq_ignore_ascii_case("GET") {
        easy.custom_request(&request.method).map_err(classify_curl_error)?;
    }
    if let Some(payload) = &request.body {
        easy.post_fields_copy(payload).map_err(classify_curl_error)?;
    }
    easy.follow_location(true).map_err(classify_curl_error)?;
    easy.max_redirections(10).map_err(classify_curl_error)?;
    if let Some(timeout) = request.timeout {
        easy.timeout(timeout).map_err(classify_curl_error)?;
    }

    let mut list = List::new();
    for (name, value) in &request.headers {
        list.append(&format!("{}: {}", name.trim(), value.trim()))
            .map_err(classify_curl_error)?;
    }
    if !request.headers.is_empty() {
        easy.http_headers(list).map_err(classify_curl_error)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(classify_curl_error)?;
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(classify_curl_error)?;
        transfer.perform().map_err(classify_curl_error)?;
    }

    let status = easy.response_code().map_err(classify_curl_error)? as u16;
    Ok(TransportResponse {
        status,
        headers: parse_headers(&header_lines),
        body,
        timeout: None,
    })
}

/// Parse collected header lines into a lowercased name/value map.
///
/// With redirects, libcurl delivers one header block per hop; later blocks
/// overwrite earlier ones so the final response's headers win.
fn parse_headers(lines: &[String]) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with("HTTP/") {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }
    headers
}

/// Maps a libcurl error onto the transport taxonomy.
fn classify_curl_error(e: curl::Error) -> TransportError {
    let message = e.to_string();
    if e.is_operation_timedout() {
        TransportError::TimedOut { message }
    } else if e.is_couldnt_connect() || e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy()
    {
        TransportError::Connection { message }
    } else if e.is_read_error() || e.is_recv_error() || e.is_send_error() || e.is_got_nothing() {
        TransportError::Io { message }
    } else if e.is_url_malformed() {
        TransportError::InvalidUrl { message }
    } else {
        TransportError::Other { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_lowercased_and_trimmed() {
        let lines = vec![
            "HTTP/1.1 200 OK".to_string(),
            "Content-Type: text/plain".to_string(),
            "ETag: \"abc123\"".to_string(),
            "".to_string(),
        ];
        let headers = parse_headers(&lines);
        assert_eq!(headers.get("content-type").map(String::as_str), Some("text/plain"));
        assert_eq!(headers.get("etag").map(String::as_str), Some("\"abc123\""));
        assert!(!headers.contains_key("HTTP/1.1 200 OK"));
    }

    #[test]
    fn final_hop_headers_win() {
        let lines = vec![
            "HTTP/1.1 301 Moved Permanently".to_string(),
            "Location: http://example.com/new".to_string(),
            "Content-Length: 0".to_string(),
            "".to_string(),
            "HTTP/1.1 200 OK".to_string(),
            "Content-Length: 42".to_string(),
            "".to_string(),
        ];
        let headers = parse_headers(&lines);
        assert_eq!(headers.get("content-length").map(String::as_str), Some("42"));
    }
}
