//! HTTP transport through a single proxy

use crate::error::TransportError;
use crate::proxy::ProxyRecord;
use async_trait::async_trait;
use reqwest::{Client, Proxy as ReqwestProxy};
use std::time::Duration;

/// Default timeout for one request in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Status code and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues a GET request through the given proxy
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, proxy: &ProxyRecord) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport, one client per attempt
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    timeout: Option<Duration>,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request timeout, `None` keeps reqwest's default
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create a reqwest client routing every protocol through the proxy
    fn create_client(&self, proxy: &ProxyRecord) -> Result<Client, TransportError> {
        let proxy_error = |e: reqwest::Error| TransportError::Proxy {
            proxy: proxy.to_string(),
            message: e.to_string(),
        };

        let reqwest_proxy = ReqwestProxy::all(proxy.proxy_url()).map_err(proxy_error)?;

        let mut builder = Client::builder().proxy(reqwest_proxy);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder.build().map_err(proxy_error)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, proxy: &ProxyRecord) -> Result<RawResponse, TransportError> {
        let client = self.create_client(proxy)?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                proxy: proxy.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportError::Body {
            message: e.to_string(),
        })?;

        Ok(RawResponse { status, body })
    }
}
