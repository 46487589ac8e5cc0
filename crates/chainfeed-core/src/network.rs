//! Environment resolution from a network id.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// Networks the aggregator has known deployments on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownNetwork {
    Live,
    Morden,
    Ropsten,
}

impl KnownNetwork {
    pub fn from_id(network_id: u64) -> Option<Self> {
        match network_id {
            1 => Some(Self::Live),
            2 => Some(Self::Morden),
            3 => Some(Self::Ropsten),
            _ => None,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Self::Live => 1,
            Self::Morden => 2,
            Self::Ropsten => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Morden => "morden",
            Self::Ropsten => "ropsten",
        }
    }
}

impl fmt::Display for KnownNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the environment label for a connection.
///
/// An explicit override is returned as-is. Otherwise `network_id` must map to
/// a [`KnownNetwork`]; anything else is fatal.
pub fn resolve_environment(
    explicit_override: Option<&str>,
    network_id: u64,
) -> Result<String, FeedError> {
    if let Some(env) = explicit_override {
        tracing::debug!(env, network_id, "environment override in effect");
        return Ok(env.to_string());
    }
    let network = KnownNetwork::from_id(network_id).ok_or(FeedError::UnknownNetwork(network_id))?;
    tracing::debug!(env = %network, network_id, "environment resolved from network id");
    Ok(network.as_str().to_string())
}
