//! Error types for the transport and facade layers.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors raised by an RPC transport or by decoding what it returned.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, non-2xx status, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The node answered, but the payload does not have the expected shape
    /// (short `eth_call` return data, non-hex quantities, ...).
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The log subscription feeding a stream was torn down.
    #[error("Subscription {id} closed")]
    SubscriptionClosed { id: String },

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if this error is transient.
    ///
    /// Nothing in this workspace retries; the classification is exposed for
    /// callers that layer their own retry policy on top.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }

    /// Returns `true` if this is a node-side execution error.
    pub fn is_execution_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }
}

/// Errors surfaced by the aggregator facade.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The bootstrap probe against the RPC endpoint failed.
    #[error("Could not connect to Ethereum RPC server at {url}")]
    RpcUnreachable {
        url: String,
        #[source]
        source: TransportError,
    },

    /// The connected network id has no known environment label.
    #[error("Unknown network version: {0}")]
    UnknownNetwork(u64),

    /// A delivered log entry does not carry the topics an update needs.
    #[error("Bad event: {0}")]
    MalformedEvent(String),

    /// A configuration value could not be interpreted.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Transport or contract-call failure, passed through untouched.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl FeedError {
    /// Returns `true` if the RPC endpoint could not be reached at bootstrap.
    pub fn is_rpc_unreachable(&self) -> bool {
        matches!(self, Self::RpcUnreachable { .. })
    }

    /// The endpoint URL attempted, when this is an unreachable-endpoint error.
    pub fn attempted_url(&self) -> Option<&str> {
        match self {
            Self::RpcUnreachable { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Returns `true` if a delivered log entry could not be decoded.
    pub fn is_malformed_event(&self) -> bool {
        matches!(self, Self::MalformedEvent(_))
    }
}
