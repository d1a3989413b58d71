//! Default transport backed by `reqwest`.

use super::{HttpRequest, Transport, TransportResponse};
use crate::config::TransportConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// [`Transport`] that sends requests with a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        info!(
            "HTTP transport configured: connect_timeout={}s, user_agent={}",
            config.connect_timeout_secs, config.user_agent
        );

        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<TransportResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            signal,
        } = request;

        let mut builder = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let exchange = async {
            let resp = builder.send().await?;
            let status = resp.status();
            let headers = resp.headers().clone();
            let body = resp.bytes().await?;
            Ok::<_, reqwest::Error>(TransportResponse {
                status,
                headers,
                body,
            })
        };

        tokio::select! {
            biased;
            _ = signal.cancelled() => {
                debug!("Aborting request to {}", url);
                Err(TransportError::Aborted)
            }
            result = exchange => result.map_err(TransportError::from),
        }
    }
}
