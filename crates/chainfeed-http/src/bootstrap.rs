//! Connection bootstrap: endpoint selection, reachability probe, account choice.

use std::time::Duration;

use alloy_primitives::Address;
use serde_json::Value;

use chainfeed_core::config::FeedConfig;
use chainfeed_core::error::{FeedError, TransportError};
use chainfeed_core::transport::RpcTransport;

use crate::client::{HttpClientConfig, HttpRpcClient};
use crate::filter::FilterPoller;

/// A probed, ready-to-use node connection.
///
/// Only obtainable through a successful probe, so holding one means the
/// endpoint answered at least once.
#[derive(Debug, Clone)]
pub struct Connection<T = HttpRpcClient> {
    transport: T,
    url: String,
    network_id: u64,
    account: Option<Address>,
    poll_interval: Duration,
}

impl Connection<HttpRpcClient> {
    /// Open an HTTP connection to the endpoint `config` selects and probe it.
    pub async fn connect(config: &FeedConfig) -> Result<Self, FeedError> {
        config.validate()?;
        let url = config.endpoint_url();
        let client = HttpRpcClient::new(
            url.as_str(),
            HttpClientConfig {
                request_timeout: config.request_timeout(),
            },
        )
        .map_err(|source| FeedError::RpcUnreachable {
            url: url.clone(),
            source,
        })?;
        Self::establish(client, config).await
    }
}

impl<T: RpcTransport + Clone> Connection<T> {
    /// Probe `transport` and pick the acting account.
    ///
    /// The `eth_coinbase` probe runs first; if it fails for any reason the
    /// endpoint is reported as unreachable. No retry is attempted.
    pub async fn establish(transport: T, config: &FeedConfig) -> Result<Self, FeedError> {
        config.validate()?;
        let url = transport.url().to_string();

        let coinbase: Option<Address> = match transport.call("eth_coinbase", vec![]).await {
            Ok(coinbase) => coinbase,
            Err(source) => {
                tracing::error!(url = %url, error = %source, "RPC endpoint unreachable");
                return Err(FeedError::RpcUnreachable { url, source });
            }
        };

        let version: Value = transport.call("net_version", vec![]).await?;
        let network_id = parse_network_id(&version).ok_or_else(|| {
            TransportError::InvalidResponse(format!("net_version returned {version}"))
        })?;

        let account = config.account.or(coinbase);
        tracing::info!(
            url = %url,
            network_id,
            account = ?account,
            account_overridden = config.account.is_some(),
            "connected to RPC endpoint"
        );

        Ok(Self {
            transport,
            url,
            network_id,
            account,
            poll_interval: config.poll_interval(),
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn network_id(&self) -> u64 {
        self.network_id
    }

    /// Default acting account: the configured override, else the node's
    /// coinbase. `None` when neither exists.
    pub fn account(&self) -> Option<Address> {
        self.account
    }

    /// A log source polling filters over this connection.
    pub fn log_source(&self) -> FilterPoller<T> {
        FilterPoller::new(self.transport.clone(), self.poll_interval)
    }
}

fn parse_network_id(version: &Value) -> Option<u64> {
    match version {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}
