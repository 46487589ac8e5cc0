//! Log filters and cancellable log subscriptions.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::Address;
use futures::stream::{BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

use crate::error::TransportError;

/// Parameters of an `eth_newFilter` / `eth_getLogs` style log filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    /// Start block: a tag (`"latest"`, `"earliest"`) or a hex quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_block: Option<String>,
    /// End block, same encoding as `from_block`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_block: Option<String>,
    /// Emitting contract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Positional topic constraints; `None` at a position matches anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Option<String>>>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_block(mut self, block: impl Into<String>) -> Self {
        self.from_block = Some(block.into());
        self
    }

    pub fn to_block(mut self, block: impl Into<String>) -> Self {
        self.to_block = Some(block.into());
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Constrain topic `index` to `topic`, widening the topic list as needed.
    pub fn topic(mut self, index: usize, topic: impl Into<String>) -> Self {
        let topics = self.topics.get_or_insert_with(Vec::new);
        if topics.len() <= index {
            topics.resize(index + 1, None);
        }
        topics[index] = Some(topic.into());
        self
    }
}

/// Cancellation handle for a live subscription.
///
/// Clones share one cancellation flag; cancelling any clone cancels all.
#[derive(Clone)]
pub struct SubscriptionHandle {
    id: String,
    cancel: Arc<watch::Sender<bool>>,
}

impl SubscriptionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            id: id.into(),
            cancel: Arc::new(tx),
        }
    }

    /// Provider-assigned subscription (filter) id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// A future-producing signal that resolves once `cancel` is called.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal(self.cancel.subscribe())
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Receiving side of a [`SubscriptionHandle`].
pub struct CancelSignal(watch::Receiver<bool>);

impl CancelSignal {
    /// Resolves when the subscription is cancelled.
    ///
    /// If every handle is dropped without cancelling, this never resolves.
    pub async fn cancelled(mut self) {
        loop {
            if *self.0.borrow_and_update() {
                return;
            }
            if self.0.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// A live log subscription: raw entries plus the handle that ends them.
pub struct LogSubscription {
    handle: SubscriptionHandle,
    logs: BoxStream<'static, Result<Value, TransportError>>,
}

impl LogSubscription {
    pub fn new<S>(handle: SubscriptionHandle, logs: S) -> Self
    where
        S: Stream<Item = Result<Value, TransportError>> + Send + 'static,
    {
        Self {
            handle,
            logs: logs.boxed(),
        }
    }

    pub fn handle(&self) -> &SubscriptionHandle {
        &self.handle
    }

    pub fn into_parts(
        self,
    ) -> (
        SubscriptionHandle,
        BoxStream<'static, Result<Value, TransportError>>,
    ) {
        (self.handle, self.logs)
    }
}

impl fmt::Debug for LogSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSubscription")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
