//! Per-call request options.

use crate::mock::MockFn;
use crate::response::ResponseShape;
use crate::template::Params;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Encoding of the request body. Only JSON is supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestContentType {
    #[default]
    Json,
}

impl RequestContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            RequestContentType::Json => "application/json",
        }
    }

    /// Unknown encodings fall back to JSON.
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" | "application/json" => RequestContentType::Json,
            other => {
                warn!("Unsupported request content type '{}', encoding as JSON", other);
                RequestContentType::Json
            }
        }
    }
}

/// Options shared by every entry point, excluding method, URL and params.
pub struct CallOptions<T> {
    pub response_shape: ResponseShape,
    pub content_type: RequestContentType,
    /// Extra headers; applied after `Content-Type` so they can override it.
    pub headers: HeaderMap,
    /// Track the in-flight request under this id.
    pub request_id: Option<String>,
    /// Use `mock_fn` for this call even if the client is not in mock mode.
    pub mock: bool,
    pub mock_fn: Option<MockFn<T>>,
}

impl<T> CallOptions<T> {
    pub fn new() -> Self {
        Self {
            response_shape: ResponseShape::default(),
            content_type: RequestContentType::default(),
            headers: HeaderMap::new(),
            request_id: None,
            mock: false,
            mock_fn: None,
        }
    }

    pub fn shape(mut self, shape: ResponseShape) -> Self {
        self.response_shape = shape;
        self
    }

    pub fn content_type(mut self, content_type: RequestContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Mock this call with `fake`, regardless of the client mock flag.
    pub fn mock_with<F>(mut self, fake: F) -> Self
    where
        F: Fn(Params) -> T + Send + Sync + 'static,
    {
        self.mock = true;
        self.mock_fn = Some(Arc::new(fake));
        self
    }

    /// Supply an override that is only used when the client is in mock mode.
    pub fn fallback_mock<F>(mut self, fake: F) -> Self
    where
        F: Fn(Params) -> T + Send + Sync + 'static,
    {
        self.mock_fn = Some(Arc::new(fake));
        self
    }
}

impl<T> Default for CallOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CallOptions<T> {
    fn clone(&self) -> Self {
        Self {
            response_shape: self.response_shape,
            content_type: self.content_type,
            headers: self.headers.clone(),
            request_id: self.request_id.clone(),
            mock: self.mock,
            mock_fn: self.mock_fn.clone(),
        }
    }
}

impl<T> fmt::Debug for CallOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("response_shape", &self.response_shape)
            .field("content_type", &self.content_type)
            .field("headers", &self.headers)
            .field("request_id", &self.request_id)
            .field("mock", &self.mock)
            .field("has_mock_fn", &self.mock_fn.is_some())
            .finish()
    }
}

/// Full description of one request for [`Client::request`](super::Client::request).
pub struct RequestOptions<T> {
    /// `None` behaves like GET.
    pub method: Option<Method>,
    /// Appended to the client base URL; may contain `:name` placeholders.
    pub url: String,
    /// Query parameters for GET, body otherwise.
    pub params: Option<Params>,
    pub options: CallOptions<T>,
}

impl<T> RequestOptions<T> {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            method: None,
            url: url.into(),
            params: None,
            options: CallOptions::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    pub fn options(mut self, options: CallOptions<T>) -> Self {
        self.options = options;
        self
    }
}

impl<T> Clone for RequestOptions<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            url: self.url.clone(),
            params: self.params.clone(),
            options: self.options.clone(),
        }
    }
}

impl<T> fmt::Debug for RequestOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("params", &self.params)
            .field("options", &self.options)
            .finish()
    }
}
