//! HTTP JSON-RPC client backed by `reqwest`.
//!
//! Deliberately thin: one POST per request, a per-request timeout, and no
//! retry. Retry and backoff belong to the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use chainfeed_core::error::TransportError;
use chainfeed_core::request::{JsonRpcRequest, JsonRpcResponse, RequestIds};
use chainfeed_core::transport::RpcTransport;

/// Configuration for `HttpRpcClient`.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP JSON-RPC client. Cheap to clone; clones share the connection pool
/// and the request-id counter.
#[derive(Clone)]
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    ids: Arc<RequestIds>,
    request_timeout: Duration,
}

impl HttpRpcClient {
    /// Create a new client for the given JSON-RPC endpoint URL.
    pub fn new(url: impl Into<String>, config: HttpClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            http,
            ids: Arc::new(RequestIds::new()),
            request_timeout: config.request_timeout,
        })
    }

    /// Create with default configuration.
    pub fn default_for(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(url, HttpClientConfig::default())
    }

    fn map_reqwest(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else if e.is_decode() {
            TransportError::InvalidResponse(e.to_string())
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

impl std::fmt::Debug for HttpRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRpcClient")
            .field("url", &self.url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        tracing::trace!(method = %req.method, id = %req.id, url = %self.url, "sending request");

        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| self.map_reqwest(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        resp.json::<JsonRpcResponse>()
            .await
            .map_err(|e| self.map_reqwest(e))
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.ids.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_request_ids() {
        let client = HttpRpcClient::default_for("http://localhost:8545").unwrap();
        let clone = client.clone();
        assert_eq!(client.next_id(), 1);
        assert_eq!(clone.next_id(), 2);
        assert_eq!(clone.url(), "http://localhost:8545");
    }

    #[tokio::test]
    async fn refused_connection_is_http_error() {
        let client = HttpRpcClient::new(
            "http://127.0.0.1:1",
            HttpClientConfig {
                request_timeout: Duration::from_secs(2),
            },
        )
        .unwrap();
        let res: Result<String, _> = client.call("eth_coinbase", vec![]).await;
        let err = res.unwrap_err();
        assert!(err.is_retryable(), "unexpected error: {err}");
    }
}
