//! chainfeed-http — HTTP JSON-RPC transport for ChainFeed.
//!
//! # Features
//! - [`HttpRpcClient`]: one POST per request, per-request timeout, no retry
//! - [`FilterPoller`]: log subscriptions as polled node-side filters
//! - [`Connection`]: endpoint selection, fail-fast reachability probe and
//!   default-account selection

pub mod bootstrap;
pub mod client;
pub mod filter;

pub use bootstrap::Connection;
pub use client::{HttpClientConfig, HttpRpcClient};
pub use filter::FilterPoller;
