//! The aggregator contract's read surface.

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::ContributorId;

/// Typed accessors of a deployed aggregator contract, one per contract method.
///
/// Every call is an independent read; implementations make no consistency
/// promise across calls.
#[async_trait]
pub trait AggregatorContract: Send + Sync + 'static {
    /// Address the contract is deployed at.
    fn address(&self) -> Address;

    async fn owner(&self, id: &ContributorId) -> Result<Address, TransportError>;

    /// Raw fixed-width label, NUL padded on the right.
    async fn label(&self, id: &ContributorId) -> Result<B256, TransportError>;

    async fn minimum_valid(&self, id: &ContributorId) -> Result<U256, TransportError>;

    /// Current value and whether it is available.
    async fn try_get(&self, id: &ContributorId) -> Result<(U256, bool), TransportError>;
}
