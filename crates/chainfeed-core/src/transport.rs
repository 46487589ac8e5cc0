//! The capability traits the facade is built on.
//!
//! [`RpcTransport`] is the request/response side of a node connection and
//! [`LogSource`] the log-subscription side. Both are plain async traits so
//! tests can substitute deterministic doubles.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;
use crate::filter::{LogFilter, LogSubscription};
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// An async JSON-RPC transport.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single JSON-RPC request and return the response.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;

    /// Return the endpoint this transport talks to.
    fn url(&self) -> &str;

    /// Id for the next outgoing request.
    fn next_id(&self) -> u64 {
        1
    }

    /// Convenience: call a method and deserialize the result.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TransportError>
    where
        Self: Sized,
    {
        let req = JsonRpcRequest::new(self.next_id(), method, params);
        let resp = self.send(req).await?;
        let result = resp.into_result().map_err(TransportError::Rpc)?;
        serde_json::from_value(result).map_err(TransportError::Deserialization)
    }
}

#[async_trait]
impl<T: RpcTransport> RpcTransport for std::sync::Arc<T> {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        (**self).send(req).await
    }

    fn url(&self) -> &str {
        (**self).url()
    }

    fn next_id(&self) -> u64 {
        (**self).next_id()
    }
}

/// A provider able to deliver raw log entries matching a filter.
///
/// Entries are handed over as loosely-typed JSON: nothing at this layer
/// enforces a log schema, so consumers must tolerate missing fields.
#[async_trait]
pub trait LogSource: Send + Sync + 'static {
    /// Register `filter` with the provider and start delivering matches.
    async fn subscribe_logs(&self, filter: LogFilter) -> Result<LogSubscription, TransportError>;
}

#[async_trait]
impl<S: LogSource> LogSource for std::sync::Arc<S> {
    async fn subscribe_logs(&self, filter: LogFilter) -> Result<LogSubscription, TransportError> {
        (**self).subscribe_logs(filter).await
    }
}
