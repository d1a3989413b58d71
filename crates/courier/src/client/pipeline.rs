//! Per-call request pipeline.
//!
//! 1. `base_url + url` gives the template URL.
//! 2. `:name` placeholders are filled from the params.
//! 3. GET puts the residual params in the query string, other methods send
//!    them as a JSON body.
//! 4. Mocked calls stop here and resolve from the override after a delay.
//! 5. Otherwise request interceptors run, the transport sends, the body is
//!    decoded, response interceptors run, and the future resolves.
//!
//! Interceptors are selected against the template URL, so a filter on
//! `/users/:id` applies to every interpolated user URL.

use super::options::{RequestContentType, RequestOptions};
use super::tracker::RequestTracker;
use super::ClientInner;
use crate::cancel::{cancelable, CancelableFuture};
use crate::error::RequestError;
use crate::filter::RequestTarget;
use crate::mock;
use crate::response::{FromResponse, ResponseData, ResponseShape};
use crate::template::{append_query, interpolate, Interpolated, Params};
use crate::transport::HttpRequest;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub(super) fn run<T>(inner: &Arc<ClientInner>, options: RequestOptions<T>) -> CancelableFuture<T>
where
    T: FromResponse + Send + Sync + 'static,
{
    let RequestOptions {
        method,
        url,
        params,
        options: call,
    } = options;

    let method = method.unwrap_or(Method::GET);
    let template_url = format!("{}{}", inner.config.base_url, url);
    let params = params.unwrap_or_default();
    let (future, settler) = cancelable::<T>();

    let mock_fn = if inner.config.mock || call.mock {
        call.mock_fn.clone()
    } else {
        None
    };
    let mock_params = mock_fn.as_ref().map(|_| params.clone());

    // Built in both branches so mocked calls fail the same way on bad input
    let request = match build_request(
        &method,
        &template_url,
        params,
        call.content_type,
        &call.headers,
        settler.signal().clone(),
    ) {
        Ok(request) => request,
        Err(e) => {
            settler.reject(e);
            return future;
        }
    };

    if let (Some(fake), Some(params)) = (mock_fn, mock_params) {
        debug!("Mocking {} {}", method, template_url);
        mock::spawn_mock(settler, fake, params);
        return future;
    }

    let tracked_id = call
        .request_id
        .filter(|id| inner.tracker.track(id, &future));

    let inner = Arc::clone(inner);
    let shape = call.response_shape;
    tokio::spawn(async move {
        // Also runs if an interceptor panics and the task unwinds
        let release = Release {
            tracker: &inner.tracker,
            id: tracked_id,
        };

        let outcome = tokio::select! {
            biased;
            _ = settler.signal().cancelled() => None,
            result = exchange(&inner, request, &template_url, shape) => Some(result),
        };

        drop(release);

        match outcome {
            Some(Ok(data)) => match T::from_response(data) {
                Ok(value) => {
                    settler.resolve(value);
                }
                Err(e) => {
                    settler.reject(e);
                }
            },
            Some(Err(e)) => {
                debug!("Request to {} failed: {}", template_url, e);
                settler.reject(e);
            }
            None => debug!("Request to {} canceled in flight", template_url),
        }
    });

    future
}

/// Releases the tracker entry a call inserted when dropped.
struct Release<'a> {
    tracker: &'a RequestTracker,
    id: Option<String>,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.tracker.release(&id);
        }
    }
}

/// Interpolate the URL, place residual params, and assemble the request.
pub(super) fn build_request(
    method: &Method,
    template_url: &str,
    params: Params,
    content_type: RequestContentType,
    headers: &HeaderMap,
    signal: CancellationToken,
) -> Result<HttpRequest, RequestError> {
    if template_url.is_empty() {
        return Err(RequestError::InvalidRequest("request URL is empty".to_string()));
    }

    let Interpolated { url, residual } = interpolate(template_url, params);
    let is_get = *method == Method::GET;

    let url = if is_get {
        append_query(&url, &residual)
    } else {
        url
    };

    let mut request = HttpRequest::new(method.clone(), url, signal);
    request
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type.mime()));
    for name in headers.keys() {
        request.headers.remove(name);
        for value in headers.get_all(name) {
            request.headers.append(name.clone(), value.clone());
        }
    }

    if !is_get {
        let body = serde_json::to_vec(&residual).map_err(|e| RequestError::Encode(e.to_string()))?;
        request.body = Some(Bytes::from(body));
    }

    Ok(request)
}

/// Interceptors, dispatch and decoding for a real request.
async fn exchange(
    inner: &ClientInner,
    request: HttpRequest,
    template_url: &str,
    shape: ResponseShape,
) -> Result<ResponseData, RequestError> {
    let method = request.method.as_str().to_uppercase();

    let target = RequestTarget::new(&method, template_url, request.content_type());
    let request = inner
        .request_interceptors
        .pipe(&target, request)
        .map_err(RequestError::interceptor)?;

    debug!("Dispatching {} {}", request.method, request.url);
    let response = inner.transport.send(request).await?;
    debug!(
        "Received {} from {} ({} bytes)",
        response.status,
        template_url,
        response.body.len()
    );

    let data = response.decode(shape)?;

    let target = RequestTarget::new(&method, template_url, Some(shape.as_str()));
    inner
        .response_interceptors
        .pipe(&target, data)
        .map_err(RequestError::interceptor)
}
