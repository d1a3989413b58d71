//! Typed endpoints bound to a method and URL template.
//!
//! ```no_run
//! use courier::{ApiBuilder, ApiBuilderOptions, CallOptions, Client, ClientConfig, Json};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct UserQuery { id: u64 }
//!
//! #[derive(Clone, Deserialize)]
//! struct User { name: String }
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = Client::from_config(ClientConfig::new("https://api.example.com"))?;
//! let api = ApiBuilder::new(client, ApiBuilderOptions::default());
//! let get_user = api.get::<UserQuery, Json<User>>("/users/:id", CallOptions::new());
//! let user = get_user.call(&UserQuery { id: 7 }).await?;
//! println!("{}", user.0.name);
//! # Ok(())
//! # }
//! ```

use crate::cancel::{cancelable, CancelableFuture};
use crate::client::{CallOptions, Client};
use crate::mock::{self, MockFn};
use crate::response::FromResponse;
use crate::template::{interpolate, to_params, Interpolated, Params};
use parking_lot::RwLock;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiBuilderOptions {
    /// Resolve endpoints from their fake instead of the network.
    pub mock: bool,
}

/// Factory for [`Endpoint`]s sharing one client.
#[derive(Clone)]
pub struct ApiBuilder {
    client: Client,
    options: ApiBuilderOptions,
}

impl ApiBuilder {
    pub fn new(client: Client, options: ApiBuilderOptions) -> Self {
        Self { client, options }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fakes apply when either the builder or the client is in mock mode.
    pub fn is_mock(&self) -> bool {
        self.options.mock || self.client.is_mock()
    }

    pub fn get<P, T>(&self, url: &str, options: CallOptions<T>) -> Endpoint<P, T> {
        self.endpoint(Method::GET, url, options)
    }

    pub fn post<P, T>(&self, url: &str, options: CallOptions<T>) -> Endpoint<P, T> {
        self.endpoint(Method::POST, url, options)
    }

    pub fn put<P, T>(&self, url: &str, options: CallOptions<T>) -> Endpoint<P, T> {
        self.endpoint(Method::PUT, url, options)
    }

    pub fn patch<P, T>(&self, url: &str, options: CallOptions<T>) -> Endpoint<P, T> {
        self.endpoint(Method::PATCH, url, options)
    }

    pub fn delete<P, T>(&self, url: &str, options: CallOptions<T>) -> Endpoint<P, T> {
        self.endpoint(Method::DELETE, url, options)
    }

    fn endpoint<P, T>(&self, method: Method, url: &str, options: CallOptions<T>) -> Endpoint<P, T> {
        Endpoint {
            inner: Arc::new(EndpointInner {
                client: self.client.clone(),
                method,
                url: url.to_string(),
                options,
                mock: self.is_mock(),
                fake: RwLock::new(None),
            }),
            _params: PhantomData,
        }
    }
}

struct EndpointInner<T> {
    client: Client,
    method: Method,
    url: String,
    options: CallOptions<T>,
    mock: bool,
    fake: RwLock<Option<MockFn<T>>>,
}

/// A callable bound to one method and URL template.
///
/// `P` is serialized to the parameter bag; `T` is the decoded response.
/// Clones share the same fake.
pub struct Endpoint<P, T> {
    inner: Arc<EndpointInner<T>>,
    _params: PhantomData<fn(&P)>,
}

impl<P, T> Endpoint<P, T>
where
    P: Serialize,
    T: FromResponse + Send + Sync + 'static,
{
    pub fn call(&self, params: &P) -> CancelableFuture<T> {
        self.call_with_id(params, None)
    }

    pub fn call_with_id(&self, params: &P, id: Option<&str>) -> CancelableFuture<T> {
        let params = match to_params(params) {
            Ok(params) => params,
            Err(e) => return CancelableFuture::rejected(e),
        };
        let Interpolated { url, residual } = interpolate(&self.inner.url, params);

        let fake = if self.inner.mock {
            self.inner.fake.read().clone()
        } else {
            None
        };
        if let Some(fake) = fake {
            debug!("Faking {} {}", self.inner.method, url);
            let (future, settler) = cancelable();
            mock::spawn_mock(settler, fake, residual);
            return future;
        }

        let mut options = self.inner.options.clone();
        if let Some(id) = id {
            options.request_id = Some(id.to_string());
        }
        self.inner
            .client
            .with_method(self.inner.method.clone(), &url, Some(residual), options)
    }
}

impl<P, T> Endpoint<P, T> {
    /// Attach a fake, replacing any previous one.
    pub fn fake<F>(self, fake: F) -> Self
    where
        F: Fn(Params) -> T + Send + Sync + 'static,
    {
        self.set_fake(fake);
        self
    }

    pub fn set_fake<F>(&self, fake: F)
    where
        F: Fn(Params) -> T + Send + Sync + 'static,
    {
        *self.inner.fake.write() = Some(Arc::new(fake));
    }

    pub fn clear_fake(&self) {
        *self.inner.fake.write() = None;
    }

    pub fn has_fake(&self) -> bool {
        self.inner.fake.read().is_some()
    }

    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }
}

impl<P, T> Clone for Endpoint<P, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _params: PhantomData,
        }
    }
}

impl<P, T> fmt::Debug for Endpoint<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.inner.method)
            .field("url", &self.inner.url)
            .field("mock", &self.inner.mock)
            .field("has_fake", &self.has_fake())
            .finish()
    }
}
