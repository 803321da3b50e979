//! MessageSource - unified stream source abstraction

use std::sync::Arc;

use crate::FeedEvent;

/// Stream event callback.
///
/// Runs on the source's producer thread; it must stay cheap and
/// non-blocking.
pub type FeedCallback = Arc<dyn Fn(FeedEvent) + Send + Sync>;

/// Anything that can produce SENSR stream events.
///
/// Implemented by the mock feed and the recording replay; the feed
/// pipeline drives every source through this one interface.
pub trait MessageSource: Send + Sync + std::fmt::Debug {
    /// Source ID, unique within a pipeline
    fn source_id(&self) -> &str;

    /// Start producing events into `callback`.
    ///
    /// Calling `listen` while already listening is a no-op.
    fn listen(&self, callback: FeedCallback);

    /// Stop producing. Idempotent.
    fn stop(&self);

    /// Whether the source is currently producing
    fn is_listening(&self) -> bool;
}
