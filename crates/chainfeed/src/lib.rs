//! chainfeed — client facade over an on-chain aggregator (oracle) contract.
//!
//! # Quick start
//! ```rust,no_run
//! use chainfeed::{Aggregator, ContributorId, FeedConfig, LogFilter};
//! use futures::StreamExt;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FeedConfig::from_env()?;
//! let address = "0x0000000000000000000000000000000000001234".parse()?;
//! let aggregator = Aggregator::connect(&config, address).await?;
//!
//! let record = aggregator.inspect(ContributorId::from(1u64)).await?;
//! println!("{} = {} (available: {})", record.label, record.value, record.available);
//!
//! let mut updates = aggregator.filter(LogFilter::new().from_block("latest")).await?;
//! while let Some(update) = updates.next().await {
//!     match update {
//!         Ok(event) => println!("new value {}", event.value),
//!         Err(e) => eprintln!("update error: {e}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod binding;
pub mod stream;
pub mod telemetry;

pub use aggregator::Aggregator;
pub use binding::RpcAggregatorBinding;
pub use stream::UpdateStream;
pub use telemetry::{init_tracing, LogConfig};

pub use chainfeed_core::{
    AggregatorContract, ContributorId, ContributorRecord, FeedConfig, FeedError, LogFilter,
    LogSource, RpcTransport, SubscriptionHandle, TransportError, UpdateEvent,
};
pub use chainfeed_http::{Connection, FilterPoller, HttpRpcClient};
