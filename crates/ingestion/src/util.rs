//! Feed utility functions

use std::sync::Arc;

use async_channel::{Sender, TrySendError};
use contracts::{DropPolicy, FeedEvent};
use tracing::{trace, warn};

use crate::config::FeedMetrics;

/// Send an event into the feed channel, handling backpressure policy
#[inline]
pub fn send_event(
    tx: &Sender<FeedEvent>,
    event: FeedEvent,
    metrics: &Arc<FeedMetrics>,
    source_id: &str,
    drop_policy: DropPolicy,
) {
    match tx.try_send(event) {
        Ok(_) => {
            trace!(source_id = %source_id, "event sent");
        }
        Err(TrySendError::Full(event)) => {
            metrics.record_dropped();
            match drop_policy {
                DropPolicy::DropNewest => {
                    trace!(source_id = %source_id, "event dropped (newest)");
                }
                // force_send displaces the oldest queued event; the
                // displaced one is the drop counted above.
                DropPolicy::DropOldest => match tx.force_send(event) {
                    Ok(_) => trace!(source_id = %source_id, "event dropped (oldest)"),
                    Err(_) => warn!(source_id = %source_id, "channel closed"),
                },
            }
        }
        Err(TrySendError::Closed(_)) => {
            warn!(source_id = %source_id, "channel closed");
        }
    }
}

/// Convert a slice of POD values to bytes::Bytes
#[inline]
pub fn pod_slice_to_bytes<T: bytemuck::Pod>(slice: &[T]) -> bytes::Bytes {
    bytes::Bytes::copy_from_slice(bytemuck::cast_slice(slice))
}
