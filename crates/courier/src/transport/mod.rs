//! Transport boundary.
//!
//! The pipeline never touches sockets itself. It hands an [`HttpRequest`] to a
//! [`Transport`] and gets back a buffered [`TransportResponse`] or a
//! [`TransportError`]. Transports must watch [`HttpRequest::signal`] and stop
//! promptly once it is cancelled.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;

use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tokio_util::sync::CancellationToken;

/// Transport-native request, as seen by request interceptors.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// Cancelled when the caller cancels the owning future.
    pub signal: CancellationToken,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>, signal: CancellationToken) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            signal,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Insert or replace a header.
    pub fn set_header(&mut self, name: &str, value: &str) -> anyhow::Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Builder-style [`set_header`](Self::set_header).
    pub fn with_header(mut self, name: &str, value: &str) -> anyhow::Result<Self> {
        self.set_header(name, value)?;
        Ok(self)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Fully buffered response returned by a transport.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// 200 response with a JSON body.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::new(StatusCode::OK, value.to_string())
    }
}

/// Sends one request and buffers its response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_header() {
        let mut req = HttpRequest::new(Method::GET, "/a", CancellationToken::new());
        req.set_header("X-Trace", "abc").unwrap();
        assert_eq!(req.header("x-trace"), Some("abc"));
        assert!(req.set_header("bad header", "v").is_err());
    }

    #[test]
    fn test_content_type() {
        let req = HttpRequest::new(Method::POST, "/a", CancellationToken::new())
            .with_header("content-type", "application/json")
            .unwrap();
        assert_eq!(req.content_type(), Some("application/json"));
    }
}
