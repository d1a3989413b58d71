//! Courier: client-side HTTP request orchestration.
//!
//! A [`Client`] turns a declarative request (method, URL template, params,
//! options) into a transport request, runs it through filtered request
//! interceptors, dispatches it via a [`Transport`], decodes the body, runs
//! response interceptors, and settles a [`CancelableFuture`].
//!
//! [`ApiBuilder`] binds typed [`Endpoint`]s on top of a client, each with an
//! optional fake used in mock mode.

pub mod cancel;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod filter;
pub mod interceptor;
pub mod mock;
pub mod response;
pub mod template;
pub mod transport;

pub use cancel::{cancelable, CancelableFuture, Settlement, Settler};
pub use client::{CallOptions, Client, RequestContentType, RequestOptions, RequestTracker};
pub use config::{ClientConfig, TransportConfig};
pub use endpoint::{ApiBuilder, ApiBuilderOptions, Endpoint};
pub use error::{FilterParseError, RequestError, TransportError};
pub use filter::{Filter, IntoFilter, Pattern, RequestTarget};
pub use response::{FromResponse, Json, ResponseData, ResponseShape};
pub use template::{interpolate, Interpolated, Params};
pub use transport::{HttpRequest, ReqwestTransport, Transport, TransportResponse};
