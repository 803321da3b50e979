//! Listener handle - manages a listener worker task

use std::sync::Arc;

use contracts::{FeedEvent, ListeningType, MessageListener, StreamMessage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::metrics::ListenerMetrics;

/// Handle to a running listener worker.
///
/// The subscription mask is snapshotted once at spawn. Listeners keep the
/// mask fixed for their whole lifetime, so the snapshot never goes stale.
pub struct ListenerHandle {
    name: String,
    subscriptions: ListeningType,
    tx: mpsc::Sender<FeedEvent>,
    metrics: Arc<ListenerMetrics>,
    worker_handle: JoinHandle<()>,
}

impl ListenerHandle {
    /// Spawn a new listener worker task
    pub fn spawn<L>(name: impl Into<String>, listener: L, queue_capacity: usize) -> Self
    where
        L: MessageListener + 'static,
    {
        let name = name.into();
        let subscriptions = listener.subscriptions();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(ListenerMetrics::new());

        let worker_handle = tokio::spawn(listener_worker(
            name.clone(),
            listener,
            rx,
            Arc::clone(&metrics),
        ));

        info!(
            listener = %name,
            subscriptions = ?subscriptions,
            queue_capacity,
            "listener worker started"
        );

        Self {
            name,
            subscriptions,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Listener name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscription mask snapshotted at spawn
    pub fn subscriptions(&self) -> ListeningType {
        self.subscriptions
    }

    /// Whether the listener subscribes to this message's category
    pub fn wants(&self, message: &StreamMessage) -> bool {
        self.subscriptions.intersects(message.category())
    }

    /// Listener metrics
    pub fn metrics(&self) -> &Arc<ListenerMetrics> {
        &self.metrics
    }

    /// Try to send an event to the listener without blocking.
    /// Events are dropped when the queue is full.
    pub fn try_send(&self, event: FeedEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                self.metrics.inc_dropped_count();
                warn!(
                    listener = %self.name,
                    event = event.label(),
                    "queue full, event dropped"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(listener = %self.name, "listener worker channel closed");
            }
        }
    }

    /// Shut down the listener worker, waiting for queued events to drain
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(listener = %self.name, error = %e, "listener worker panicked");
        }
    }
}

/// Worker task that feeds queued events to the listener callbacks.
///
/// Gating happens upstream in the dispatcher: by the time an event lands
/// on this queue it is either a message the mask covers or a fault.
#[instrument(name = "listener_worker", skip(listener, rx, metrics))]
async fn listener_worker<L: MessageListener>(
    name: String,
    mut listener: L,
    mut rx: mpsc::Receiver<FeedEvent>,
    metrics: Arc<ListenerMetrics>,
) {
    debug!("listener worker started");

    while let Some(event) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match event {
            FeedEvent::Message(StreamMessage::Output(message)) => {
                listener.on_output_message(&message);
                metrics.inc_delivered_count();
            }
            FeedEvent::Message(StreamMessage::PointResult(result)) => {
                listener.on_point_result(&result);
                metrics.inc_delivered_count();
            }
            FeedEvent::Fault(error) => {
                listener.on_error(&error);
                metrics.inc_fault_count();
            }
        }
    }

    info!("listener worker stopped");
}
