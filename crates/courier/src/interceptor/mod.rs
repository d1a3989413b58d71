//! Interceptor registries.
//!
//! Request interceptors rewrite the outgoing [`HttpRequest`]; response
//! interceptors rewrite decoded [`ResponseData`]. Both are selected by
//! [`Filter`](crate::filter::Filter) and run as a left-to-right fold. An
//! interceptor returning `Err` stops the fold and rejects the request.

mod registry;
mod request;
mod response;

pub use registry::InterceptorRegistry;
pub use request::RequestInterceptorRegistry;
pub use response::ResponseInterceptorRegistry;

use crate::response::ResponseData;
use crate::transport::HttpRequest;
use std::sync::Arc;

pub type RequestInterceptor = Arc<dyn Fn(HttpRequest) -> anyhow::Result<HttpRequest> + Send + Sync>;

pub type ResponseInterceptor =
    Arc<dyn Fn(ResponseData) -> anyhow::Result<ResponseData> + Send + Sync>;
