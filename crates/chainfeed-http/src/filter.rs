//! Log subscriptions over plain request/response transports.
//!
//! HTTP has no push channel, so a subscription is a node-side filter
//! (`eth_newFilter`) polled with `eth_getFilterChanges` on a fixed interval
//! by a background task. Cancelling the handle, or dropping the receiving
//! stream, stops the task and uninstalls the filter.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use chainfeed_core::error::TransportError;
use chainfeed_core::filter::{CancelSignal, LogFilter, LogSubscription, SubscriptionHandle};
use chainfeed_core::transport::{LogSource, RpcTransport};

use crate::client::HttpRpcClient;

pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

type LogSender = mpsc::UnboundedSender<Result<Value, TransportError>>;

/// [`LogSource`] that polls node-side filters.
#[derive(Debug, Clone)]
pub struct FilterPoller<T = HttpRpcClient> {
    transport: T,
    interval: Duration,
}

impl<T: RpcTransport + Clone> FilterPoller<T> {
    /// A zero `interval` is raised to [`MIN_POLL_INTERVAL`].
    pub fn new(transport: T, interval: Duration) -> Self {
        Self {
            transport,
            interval: interval.max(MIN_POLL_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl<T: RpcTransport + Clone> LogSource for FilterPoller<T> {
    async fn subscribe_logs(&self, filter: LogFilter) -> Result<LogSubscription, TransportError> {
        let params = vec![serde_json::to_value(&filter)?];
        let filter_id: String = self.transport.call("eth_newFilter", params).await?;
        tracing::info!(
            filter_id = %filter_id,
            url = %self.transport.url(),
            interval_ms = self.interval.as_millis() as u64,
            "log filter installed"
        );

        let handle = SubscriptionHandle::new(filter_id.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(poll_filter(
            self.transport.clone(),
            filter_id,
            self.interval,
            handle.signal(),
            tx,
        ));

        let logs = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(LogSubscription::new(handle, logs))
    }
}

async fn poll_filter<T: RpcTransport>(
    transport: T,
    filter_id: String,
    interval: Duration,
    signal: CancelSignal,
    tx: LogSender,
) {
    let cancelled = signal.cancelled();
    tokio::pin!(cancelled);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    'poll: loop {
        tokio::select! {
            _ = &mut cancelled => {
                tracing::debug!(filter_id = %filter_id, "log filter cancelled");
                break 'poll;
            }
            _ = tx.closed() => {
                tracing::debug!(filter_id = %filter_id, "log stream dropped");
                break 'poll;
            }
            _ = ticker.tick() => {
                let changes: Result<Option<Vec<Value>>, TransportError> = transport
                    .call("eth_getFilterChanges", vec![Value::String(filter_id.clone())])
                    .await;
                match changes {
                    Ok(entries) => {
                        for entry in entries.unwrap_or_default() {
                            if tx.send(Ok(entry)).is_err() {
                                break 'poll;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(filter_id = %filter_id, error = %e, "filter poll failed");
                        if tx.send(Err(e)).is_err() {
                            break 'poll;
                        }
                    }
                }
            }
        }
    }

    let uninstalled: Result<bool, TransportError> = transport
        .call("eth_uninstallFilter", vec![Value::String(filter_id.clone())])
        .await;
    match uninstalled {
        Ok(removed) => tracing::debug!(filter_id = %filter_id, removed, "log filter uninstalled"),
        Err(e) => tracing::warn!(filter_id = %filter_id, error = %e, "failed to uninstall log filter"),
    }
}
