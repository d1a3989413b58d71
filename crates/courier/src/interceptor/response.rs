//! Response data interceptor pipe.

use super::registry::InterceptorRegistry;
use super::ResponseInterceptor;
use crate::filter::{Filter, RequestTarget};
use crate::response::ResponseData;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
pub struct ResponseInterceptorRegistry {
    registry: InterceptorRegistry<ResponseInterceptor>,
}

impl ResponseInterceptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, filter: Filter, interceptor: F)
    where
        F: Fn(ResponseData) -> anyhow::Result<ResponseData> + Send + Sync + 'static,
    {
        self.registry.register(filter, Arc::new(interceptor));
    }

    /// Fold every matching interceptor over `data`, stopping at the first error.
    pub fn pipe(&self, target: &RequestTarget, data: ResponseData) -> anyhow::Result<ResponseData> {
        let interceptors = self.registry.matching(target);
        if !interceptors.is_empty() {
            debug!(
                "Running {} response interceptor(s) for {} {}",
                interceptors.len(),
                target.method,
                target.url
            );
        }
        interceptors
            .iter()
            .try_fold(data, |data, interceptor| interceptor(data))
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add(n: i64) -> impl Fn(ResponseData) -> anyhow::Result<ResponseData> {
        move |mut data| {
            if let Some(value) = data.as_json_mut() {
                let current = value["value"].as_i64().unwrap_or_default();
                value["value"] = json!(current + n);
            }
            Ok(data)
        }
    }

    #[test]
    fn test_pipe_folds_matching() {
        let registry = ResponseInterceptorRegistry::new();
        registry.register(Filter::url("/a").method("GET").kind("json"), add(1));
        registry.register(Filter::url("/a").method("GET").kind("json"), add(10));
        registry.register(Filter::url("/a").kind("text"), add(100));

        let target = RequestTarget::new("GET", "/a", Some("json"));
        let out = registry
            .pipe(&target, ResponseData::Json(json!({"value": 0})))
            .unwrap();
        assert_eq!(out, ResponseData::Json(json!({"value": 11})));
    }

    #[test]
    fn test_pipe_can_replace_value() {
        let registry = ResponseInterceptorRegistry::new();
        registry.register(Filter::any(), |_| Ok(ResponseData::Text("replaced".into())));

        let target = RequestTarget::new("GET", "/a", Some("json"));
        let out = registry.pipe(&target, ResponseData::Json(json!(1))).unwrap();
        assert_eq!(out.as_text(), Some("replaced"));
    }

    #[test]
    fn test_pipe_error() {
        let registry = ResponseInterceptorRegistry::new();
        registry.register(Filter::any(), |_| anyhow::bail!("bad payload"));

        let target = RequestTarget::new("GET", "/a", None);
        assert!(registry.pipe(&target, ResponseData::Json(json!(1))).is_err());
    }
}
