//! The `Aggregator` facade.
//!
//! Construction is bootstrap-or-fail: by the time an [`Aggregator`] exists,
//! the endpoint has answered the reachability probe, the environment label
//! is resolved and the contract binding is attached. There is no partially
//! usable state.

use alloy_primitives::Address;
use futures::StreamExt;

use chainfeed_core::config::FeedConfig;
use chainfeed_core::contract::AggregatorContract;
use chainfeed_core::decode::decode_label;
use chainfeed_core::error::{FeedError, TransportError};
use chainfeed_core::filter::{LogFilter, SubscriptionHandle};
use chainfeed_core::network::resolve_environment;
use chainfeed_core::transport::{LogSource, RpcTransport};
use chainfeed_core::types::{ContributorId, ContributorRecord, UpdateEvent};
use chainfeed_http::{Connection, FilterPoller, HttpRpcClient};

use crate::binding::RpcAggregatorBinding;
use crate::stream::UpdateStream;

/// Read/observe client for one deployed aggregator contract.
pub struct Aggregator<C = RpcAggregatorBinding<HttpRpcClient>, S = FilterPoller<HttpRpcClient>> {
    contract: C,
    logs: S,
    environment: String,
    account: Option<Address>,
}

impl Aggregator {
    /// Connect over HTTP using `config` and bind the contract at `address`.
    ///
    /// Fails with [`FeedError::RpcUnreachable`] if the endpoint does not
    /// answer, and [`FeedError::UnknownNetwork`] if the network cannot be
    /// named and no environment override is configured.
    pub async fn connect(config: &FeedConfig, address: Address) -> Result<Self, FeedError> {
        let connection = Connection::connect(config).await?;
        Self::from_connection(&connection, config, address)
    }
}

impl<T: RpcTransport + Clone> Aggregator<RpcAggregatorBinding<T>, FilterPoller<T>> {
    /// Bind the contract at `address` over an established connection.
    pub fn from_connection(
        connection: &Connection<T>,
        config: &FeedConfig,
        address: Address,
    ) -> Result<Self, FeedError> {
        let environment =
            resolve_environment(config.environment.as_deref(), connection.network_id())?;
        let contract = RpcAggregatorBinding::new(connection.transport().clone(), address)
            .with_from(connection.account());

        tracing::info!(
            address = %address,
            environment = %environment,
            url = %connection.url(),
            "aggregator ready"
        );
        Ok(Self::new(contract, connection.log_source(), environment, connection.account()))
    }
}

impl<C: AggregatorContract, S: LogSource> Aggregator<C, S> {
    /// Assemble a facade from already-prepared collaborators.
    pub fn new(
        contract: C,
        logs: S,
        environment: impl Into<String>,
        account: Option<Address>,
    ) -> Self {
        Self {
            contract,
            logs,
            environment: environment.into(),
            account,
        }
    }

    /// Address of the aggregator contract.
    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// Environment label (override or resolved from the network id).
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Default acting account of the underlying connection.
    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    /// Read one contributor's current state.
    ///
    /// The four reads are issued concurrently and may complete in any order;
    /// the record is a best-effort snapshot. The first failing read's error
    /// is returned as-is.
    pub async fn inspect(&self, id: ContributorId) -> Result<ContributorRecord, TransportError> {
        let (owner, label, minimum_valid, (value, available)) = futures::try_join!(
            self.contract.owner(&id),
            self.contract.label(&id),
            self.contract.minimum_valid(&id),
            self.contract.try_get(&id),
        )?;

        Ok(ContributorRecord {
            id,
            owner,
            label: decode_label(label.as_slice()),
            minimum_valid,
            value,
            available,
        })
    }

    /// Subscribe to value updates.
    ///
    /// `options` is passed to the provider with `address` always replaced by
    /// the aggregator's own address.
    pub async fn filter(&self, mut options: LogFilter) -> Result<UpdateStream, TransportError> {
        let address = self.address();
        if let Some(requested) = options.address.filter(|a| *a != address) {
            tracing::debug!(
                requested = %requested,
                address = %address,
                "ignoring caller filter address"
            );
        }
        options.address = Some(address);

        let subscription = self.logs.subscribe_logs(options).await?;
        tracing::debug!(filter_id = %subscription.handle().id(), "update subscription started");
        Ok(UpdateStream::new(subscription))
    }

    /// Callback flavour of [`filter`](Self::filter).
    ///
    /// Drives the update stream on a spawned task and invokes `callback` once
    /// per delivered log with either the decoded update or an error. Returns
    /// the handle that stops delivery.
    pub async fn filter_with<F>(
        &self,
        options: LogFilter,
        mut callback: F,
    ) -> Result<SubscriptionHandle, TransportError>
    where
        F: FnMut(Result<UpdateEvent, FeedError>) + Send + 'static,
    {
        let mut updates = self.filter(options).await?;
        let handle = updates.handle().clone();
        tokio::spawn(async move {
            while let Some(item) = updates.next().await {
                callback(item);
            }
        });
        Ok(handle)
    }
}

impl<C: AggregatorContract, S> std::fmt::Debug for Aggregator<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("address", &self.contract.address())
            .field("environment", &self.environment)
            .field("account", &self.account)
            .finish()
    }
}
