//! The request client.
//!
//! A [`Client`] owns its interceptor registries and request tracker; two
//! clients never share state. Cloning a client shares them.
//!
//! Every entry point returns a [`CancelableFuture`] immediately and does the
//! work on a spawned tokio task, so calls must be made inside a tokio runtime.

mod options;
mod pipeline;
mod tracker;

pub use options::{CallOptions, RequestContentType, RequestOptions};
pub use tracker::RequestTracker;

use crate::cancel::CancelableFuture;
use crate::config::ClientConfig;
use crate::error::FilterParseError;
use crate::filter::IntoFilter;
use crate::interceptor::{RequestInterceptorRegistry, ResponseInterceptorRegistry};
use crate::response::{FromResponse, ResponseData};
use crate::template::Params;
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use reqwest::Method;
use std::sync::Arc;
use tracing::info;

pub(crate) struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    request_interceptors: RequestInterceptorRegistry,
    response_interceptors: ResponseInterceptorRegistry,
    tracker: RequestTracker,
}

#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    pub fn new<X: Transport + 'static>(config: ClientConfig, transport: X) -> Self {
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        info!(
            "Client created: base_url='{}', mock={}",
            config.base_url, config.mock
        );
        Self {
            inner: Arc::new(ClientInner {
                config,
                transport,
                request_interceptors: RequestInterceptorRegistry::new(),
                response_interceptors: ResponseInterceptorRegistry::new(),
                tracker: RequestTracker::new(),
            }),
        }
    }

    /// Validate `config` and build a client on the default reqwest transport.
    pub fn from_config(config: ClientConfig) -> Result<Self, anyhow::Error> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.transport)?;
        Ok(Self::new(config, transport))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn base_url(&self) -> &str {
        &self.inner.config.base_url
    }

    pub fn is_mock(&self) -> bool {
        self.inner.config.mock
    }

    /// Run one request through the pipeline.
    pub fn request<T>(&self, options: RequestOptions<T>) -> CancelableFuture<T>
    where
        T: FromResponse + Send + Sync + 'static,
    {
        pipeline::run(&self.inner, options)
    }

    /// GET with `params` as the query string.
    pub fn get<T>(&self, url: &str, params: Option<Params>, options: CallOptions<T>) -> CancelableFuture<T>
    where
        T: FromResponse + Send + Sync + 'static,
    {
        self.with_method(Method::GET, url, params, options)
    }

    /// POST with `data` as the JSON body.
    pub fn post<T>(&self, url: &str, data: Option<Params>, options: CallOptions<T>) -> CancelableFuture<T>
    where
        T: FromResponse + Send + Sync + 'static,
    {
        self.with_method(Method::POST, url, data, options)
    }

    pub fn put<T>(&self, url: &str, data: Option<Params>, options: CallOptions<T>) -> CancelableFuture<T>
    where
        T: FromResponse + Send + Sync + 'static,
    {
        self.with_method(Method::PUT, url, data, options)
    }

    pub fn patch<T>(&self, url: &str, data: Option<Params>, options: CallOptions<T>) -> CancelableFuture<T>
    where
        T: FromResponse + Send + Sync + 'static,
    {
        self.with_method(Method::PATCH, url, data, options)
    }

    pub fn delete<T>(&self, url: &str, data: Option<Params>, options: CallOptions<T>) -> CancelableFuture<T>
    where
        T: FromResponse + Send + Sync + 'static,
    {
        self.with_method(Method::DELETE, url, data, options)
    }

    pub(crate) fn with_method<T>(
        &self,
        method: Method,
        url: &str,
        params: Option<Params>,
        options: CallOptions<T>,
    ) -> CancelableFuture<T>
    where
        T: FromResponse + Send + Sync + 'static,
    {
        self.request(RequestOptions {
            method: Some(method),
            url: url.to_string(),
            params,
            options,
        })
    }

    /// Register a request interceptor.
    ///
    /// `filter` is a [`Filter`](crate::filter::Filter) or a key string such as
    /// `"POST /users"`. Its URL is relative to the base URL unless it is `*`.
    pub fn register_request_interceptor<F>(
        &self,
        filter: impl IntoFilter,
        interceptor: F,
    ) -> Result<(), FilterParseError>
    where
        F: Fn(HttpRequest) -> anyhow::Result<HttpRequest> + Send + Sync + 'static,
    {
        let filter = filter.into_filter()?.with_base_url(self.base_url());
        self.inner.request_interceptors.register(filter, interceptor);
        Ok(())
    }

    /// Register a response data interceptor. Filter kinds are response shapes.
    pub fn register_response_interceptor<F>(
        &self,
        filter: impl IntoFilter,
        interceptor: F,
    ) -> Result<(), FilterParseError>
    where
        F: Fn(ResponseData) -> anyhow::Result<ResponseData> + Send + Sync + 'static,
    {
        let filter = filter.into_filter()?.with_base_url(self.base_url());
        self.inner.response_interceptors.register(filter, interceptor);
        Ok(())
    }

    /// The in-flight future tracked under `id`, if `T` matches its response type.
    pub fn get_request<T>(&self, id: &str) -> Option<CancelableFuture<T>>
    where
        T: Send + Sync + 'static,
    {
        self.inner.tracker.lookup(id)
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.inner.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RequestError, TransportError};
    use crate::transport::TransportResponse;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Echo;

    #[async_trait]
    impl Transport for Echo {
        async fn send(&self, request: HttpRequest) -> Result<TransportResponse, TransportError> {
            Ok(TransportResponse::json(&json!({
                "method": request.method.as_str(),
                "url": request.url,
            })))
        }
    }

    #[test]
    fn test_from_config_rejects_invalid_base_url() {
        assert!(Client::from_config(ClientConfig::new("ftp://files")).is_err());
        assert!(Client::from_config(ClientConfig::new("https://api.example.com")).is_ok());
    }

    #[test]
    fn test_register_with_invalid_key() {
        let client = Client::new(ClientConfig::new("http://api"), Echo);
        let err = client
            .register_request_interceptor("", Ok)
            .unwrap_err();
        assert_eq!(err, FilterParseError::Empty);
        assert!(client
            .register_response_interceptor("GET /a json extra", Ok)
            .is_err());
    }

    #[tokio::test]
    async fn test_method_helpers() {
        let client = Client::new(ClientConfig::new("http://api"), Echo);

        let value: Value = client.delete("/a/:id", None, CallOptions::new()).await.unwrap();
        assert_eq!(value, json!({"method": "DELETE", "url": "http://api/a/:id"}));

        let value: Value = client.patch("/a", None, CallOptions::new()).await.unwrap();
        assert_eq!(value["method"], "PATCH");

        let value: Value = client.put("/a", None, CallOptions::new()).await.unwrap();
        assert_eq!(value["method"], "PUT");
    }

    #[tokio::test]
    async fn test_clones_share_interceptors() {
        let client = Client::new(ClientConfig::new("http://api"), Echo);
        let clone = client.clone();
        clone
            .register_request_interceptor("GET /a", |_| anyhow::bail!("blocked"))
            .unwrap();

        let err = client.get::<Value>("/a", None, CallOptions::new()).await.unwrap_err();
        assert!(matches!(err, RequestError::Interceptor(_)));
    }
}
