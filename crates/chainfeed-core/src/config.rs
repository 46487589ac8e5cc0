//! Connection configuration.
//!
//! Everything the facade would otherwise read from process-wide state lives
//! in [`FeedConfig`] and is passed in at construction time.

use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

pub const DEFAULT_RPC_HOST: &str = "localhost";
pub const DEFAULT_RPC_PORT: u16 = 8545;

pub const ENV_RPC_HOST: &str = "ETH_RPC_HOST";
pub const ENV_RPC_PORT: &str = "ETH_RPC_PORT";
pub const ENV_RPC_URL: &str = "ETH_RPC_URL";
pub const ENV_ACCOUNT: &str = "ETH_ACCOUNT";
pub const ENV_ENVIRONMENT: &str = "ETH_ENV";

/// Overrides and tunables for connecting to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Host used to build the default endpoint URL.
    #[serde(default)]
    pub rpc_host: Option<String>,
    /// Port used to build the default endpoint URL.
    #[serde(default)]
    pub rpc_port: Option<u16>,
    /// Full endpoint URL; beats host/port.
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Acting account; replaces the node's coinbase.
    #[serde(default)]
    pub account: Option<Address>,
    /// Environment label; replaces the network-id lookup.
    #[serde(default)]
    pub environment: Option<String>,
    /// Per-request HTTP timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Interval between `eth_getFilterChanges` polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            rpc_host: None,
            rpc_port: None,
            rpc_url: None,
            account: None,
            environment: None,
            request_timeout_ms: default_request_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl FeedConfig {
    /// Build a config from the `ETH_*` process environment variables.
    pub fn from_env() -> Result<Self, FeedError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FeedError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let rpc_port = get(ENV_RPC_PORT)
            .map(|port| {
                port.parse::<u16>()
                    .map_err(|_| FeedError::Config(format!("{ENV_RPC_PORT} is not a port: {port:?}")))
            })
            .transpose()?;

        let account = get(ENV_ACCOUNT)
            .map(|account| {
                account
                    .parse::<Address>()
                    .map_err(|_| FeedError::Config(format!("{ENV_ACCOUNT} is not an address: {account:?}")))
            })
            .transpose()?;

        Ok(Self {
            rpc_host: get(ENV_RPC_HOST),
            rpc_port,
            rpc_url: get(ENV_RPC_URL),
            account,
            environment: get(ENV_ENVIRONMENT),
            ..Self::default()
        })
    }

    /// Point at a full endpoint URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    pub fn with_account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub fn with_environment(mut self, env: impl Into<String>) -> Self {
        self.environment = Some(env.into());
        self
    }

    /// Reject tunables the transport cannot run with.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.request_timeout_ms == 0 {
            return Err(FeedError::Config("request_timeout_ms must be non-zero".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(FeedError::Config("poll_interval_ms must be non-zero".into()));
        }
        Ok(())
    }

    /// Endpoint URL: explicit URL, else `http://{host}:{port}` with defaults.
    pub fn endpoint_url(&self) -> String {
        if let Some(url) = &self.rpc_url {
            return url.clone();
        }
        let host = self.rpc_host.as_deref().unwrap_or(DEFAULT_RPC_HOST);
        let port = self.rpc_port.unwrap_or(DEFAULT_RPC_PORT);
        format!("http://{host}:{port}")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
