//! HTTP transport boundary
//!
//! Providers never talk to the network directly. They go through a
//! [`Transport`], which [`TrackedTransport`] registers with a
//! [`ListenTracker`] so regions can wait for outstanding calls.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use trellis_regions::ListenTracker;

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("Could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// JSON request/response transport
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> TransportResult<Value>;

    async fn post(&self, url: &str, body: &Value) -> TransportResult<Value>;
}

/// Transport whose calls count as in-flight operations
pub struct TrackedTransport {
    inner: Arc<dyn Transport>,
    tracker: ListenTracker,
}

impl TrackedTransport {
    pub fn new(inner: Arc<dyn Transport>, tracker: ListenTracker) -> Self {
        Self { inner, tracker }
    }

    pub fn tracker(&self) -> &ListenTracker {
        &self.tracker
    }
}

#[async_trait]
impl Transport for TrackedTransport {
    async fn get(&self, url: &str) -> TransportResult<Value> {
        self.tracker.track(self.inner.get(url)).await
    }

    async fn post(&self, url: &str, body: &Value) -> TransportResult<Value> {
        self.tracker.track(self.inner.post(url, body)).await
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use async_trait::async_trait;
    use reqwest::Client;
    use serde_json::Value;
    use url::Url;

    use super::{Transport, TransportError, TransportResult};

    /// [`Transport`] over `reqwest`
    ///
    /// Relative URLs (such as `/api/Operation`) resolve against the base URL.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: Client,
        base: Option<Url>,
    }

    impl HttpTransport {
        /// Transport for absolute URLs only
        pub fn new() -> Self {
            Self {
                client: Client::new(),
                base: None,
            }
        }

        /// Transport resolving relative URLs against `base`
        pub fn with_base(base: &str) -> TransportResult<Self> {
            let base = Url::parse(base).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", base, e)))?;
            Ok(Self {
                client: Client::new(),
                base: Some(base),
            })
        }

        fn resolve(&self, url: &str) -> TransportResult<Url> {
            let resolved = match &self.base {
                Some(base) => base.join(url),
                None => Url::parse(url),
            };
            resolved.map_err(|e| TransportError::InvalidUrl(format!("{}: {}", url, e)))
        }

        async fn send(&self, request: reqwest::RequestBuilder, url: &Url) -> TransportResult<Value> {
            let response = request.send().await.map_err(|e| TransportError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            response.json::<Value>().await.map_err(|e| TransportError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
        }
    }

    impl Default for HttpTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        async fn get(&self, url: &str) -> TransportResult<Value> {
            let url = self.resolve(url)?;
            log::debug!("GET {}", url);
            self.send(self.client.get(url.clone()), &url).await
        }

        async fn post(&self, url: &str, body: &Value) -> TransportResult<Value> {
            let url = self.resolve(url)?;
            log::debug!("POST {}", url);
            self.send(self.client.post(url.clone()).json(body), &url).await
        }
    }

}
