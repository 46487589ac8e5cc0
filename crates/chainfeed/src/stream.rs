//! Decoded update streams.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Stream, StreamExt};
use serde_json::Value;

use chainfeed_core::decode::decode_update;
use chainfeed_core::error::{FeedError, TransportError};
use chainfeed_core::filter::{LogSubscription, SubscriptionHandle};
use chainfeed_core::types::UpdateEvent;

/// Stream of decoded value updates from one log subscription.
///
/// Every delivered log yields exactly one item: the decoded update, or the
/// error explaining why there is none. Errors never end the stream; it ends
/// when the subscription is cancelled or the provider closes it.
pub struct UpdateStream {
    handle: SubscriptionHandle,
    inner: BoxStream<'static, Result<UpdateEvent, FeedError>>,
}

impl UpdateStream {
    pub fn new(subscription: LogSubscription) -> Self {
        let (handle, logs) = subscription.into_parts();
        let filter_id = handle.id().to_string();
        let inner = logs
            .map(move |item| decode_item(&filter_id, item))
            .take_until(handle.signal().cancelled())
            .boxed();
        Self { handle, inner }
    }

    /// Handle for cancelling the subscription from elsewhere.
    pub fn handle(&self) -> &SubscriptionHandle {
        &self.handle
    }

    /// Stop the subscription; the stream ends after any in-flight item.
    pub fn cancel(&self) {
        self.handle.cancel();
    }
}

fn decode_item(
    filter_id: &str,
    item: Result<Value, TransportError>,
) -> Result<UpdateEvent, FeedError> {
    let entry = item?;
    decode_update(&entry).map_err(|err| {
        tracing::warn!(filter_id, error = %err, "malformed update log");
        err
    })
}

impl Stream for UpdateStream {
    type Item = Result<UpdateEvent, FeedError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl fmt::Debug for UpdateStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateStream")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
