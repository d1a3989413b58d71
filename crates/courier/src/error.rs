//! Error types shared across the request pipeline.

use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request timed out")]
    Timeout,
    #[error("request aborted by caller")]
    Aborted,
    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Reason a [`CancelableFuture`](crate::cancel::CancelableFuture) was rejected.
///
/// Cloneable so that every clone of a future observes the same rejection.
#[derive(Error, Debug, Clone)]
pub enum RequestError {
    #[error("request canceled")]
    Canceled,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("interceptor failed: {0}")]
    Interceptor(Arc<anyhow::Error>),
    #[error("failed to decode {shape} response: {message}")]
    Decode { shape: String, message: String },
    #[error("failed to encode request: {0}")]
    Encode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("request dropped before it settled")]
    Abandoned,
}

impl RequestError {
    pub(crate) fn interceptor(e: anyhow::Error) -> Self {
        RequestError::Interceptor(Arc::new(e))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, RequestError::Canceled)
    }
}

/// A filter key string that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterParseError {
    #[error("filter key is empty")]
    Empty,
    #[error("filter key '{0}' has more than three space-separated parts")]
    TooManyParts(String),
}
