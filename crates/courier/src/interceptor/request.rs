//! Request interceptor pipe.

use super::registry::InterceptorRegistry;
use super::RequestInterceptor;
use crate::filter::{Filter, RequestTarget};
use crate::transport::HttpRequest;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
pub struct RequestInterceptorRegistry {
    registry: InterceptorRegistry<RequestInterceptor>,
}

impl RequestInterceptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, filter: Filter, interceptor: F)
    where
        F: Fn(HttpRequest) -> anyhow::Result<HttpRequest> + Send + Sync + 'static,
    {
        self.registry.register(filter, Arc::new(interceptor));
    }

    /// Fold every matching interceptor over `request`, stopping at the first error.
    pub fn pipe(&self, target: &RequestTarget, request: HttpRequest) -> anyhow::Result<HttpRequest> {
        let interceptors = self.registry.matching(target);
        if !interceptors.is_empty() {
            debug!(
                "Running {} request interceptor(s) for {} {}",
                interceptors.len(),
                target.method,
                target.url
            );
        }
        interceptors
            .iter()
            .try_fold(request, |request, interceptor| interceptor(request))
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
