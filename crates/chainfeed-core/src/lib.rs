//! chainfeed-core — traits and types shared by the ChainFeed crates.
//!
//! # Overview
//!
//! ChainFeed is a read/observe-only client for an on-chain aggregator
//! (oracle) contract. This crate defines:
//!
//! - [`RpcTransport`] / [`LogSource`] — the node capabilities the facade needs
//! - [`AggregatorContract`] — the contract's typed read surface
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`] — wire types
//! - [`TransportError`] / [`FeedError`] — structured errors
//! - [`FeedConfig`] — explicit connection configuration
//! - [`resolve_environment`] — network id → environment label
//! - [`decode`] — label and update-log decoding

pub mod config;
pub mod contract;
pub mod decode;
pub mod error;
pub mod filter;
pub mod network;
pub mod request;
pub mod transport;
pub mod types;

pub use config::FeedConfig;
pub use contract::AggregatorContract;
pub use decode::{decode_label, decode_update};
pub use error::{FeedError, TransportError};
pub use filter::{CancelSignal, LogFilter, LogSubscription, SubscriptionHandle};
pub use network::{resolve_environment, KnownNetwork};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestIds, RpcId};
pub use transport::{LogSource, RpcTransport};
pub use types::{ContributorId, ContributorRecord, UpdateEvent};
