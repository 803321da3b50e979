//! Feed pipeline main entry

use std::collections::HashMap;
use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender};
use contracts::{FeedEvent, MessageSource};
use tracing::{debug, info, instrument};

use crate::adapter::SourceAdapter;
use crate::config::{BackpressureConfig, FeedMetrics};

/// Feed pipeline
///
/// Manages the registered stream sources and funnels their events into one
/// bounded channel for the dispatcher to consume.
pub struct FeedPipeline {
    /// Registered adapters
    adapters: HashMap<String, SourceAdapter>,

    /// Shared metrics
    metrics: Arc<FeedMetrics>,

    /// Event sender (shared by all adapters)
    tx: Sender<FeedEvent>,

    /// Event receiver
    rx: Option<Receiver<FeedEvent>>,

    /// Default backpressure configuration
    default_config: BackpressureConfig,
}

impl FeedPipeline {
    /// Create new pipeline with the given channel capacity
    pub fn new(channel_capacity: usize) -> Self {
        Self::with_config(BackpressureConfig {
            channel_capacity,
            ..Default::default()
        })
    }

    /// Create with custom backpressure configuration
    pub fn with_config(config: BackpressureConfig) -> Self {
        let (tx, rx) = bounded(config.channel_capacity);

        Self {
            adapters: HashMap::new(),
            metrics: Arc::new(FeedMetrics::new()),
            tx,
            rx: Some(rx),
            default_config: config,
        }
    }

    /// Register a stream source
    ///
    /// # Arguments
    /// * `source` - Data source implementing `MessageSource`
    /// * `config` - Optional backpressure override for this source
    #[instrument(
        name = "feed_register_source",
        skip(self, source, config),
        fields(source_id = %source.source_id())
    )]
    pub fn register_source(
        &mut self,
        source: Box<dyn MessageSource>,
        config: Option<BackpressureConfig>,
    ) {
        let source_id = source.source_id().to_string();
        let adapter = SourceAdapter::new(
            source_id.clone(),
            source,
            config.unwrap_or_else(|| self.default_config.clone()),
        );
        debug!(source_id = %source_id, "registered stream source");
        self.adapters.insert(source_id, adapter);
    }

    /// Start all registered sources
    #[instrument(name = "feed_start_all", skip(self))]
    pub fn start_all(&self) {
        info!(count = self.adapters.len(), "starting all source adapters");
        for adapter in self.adapters.values() {
            if !adapter.is_listening() {
                debug!(source_id = %adapter.source_id(), "starting adapter");
                adapter.start(self.tx.clone(), self.metrics.clone());
            }
        }
    }

    /// Stop all sources
    #[instrument(name = "feed_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.adapters.len(), "stopping all source adapters");
        for adapter in self.adapters.values() {
            if adapter.is_listening() {
                debug!(source_id = %adapter.source_id(), "stopping adapter");
                adapter.stop();
            }
        }
    }

    /// Get the event receiver
    ///
    /// Note: can only be taken once, subsequent calls return None
    pub fn take_receiver(&mut self) -> Option<Receiver<FeedEvent>> {
        self.rx.take()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<FeedMetrics> {
        self.metrics.clone()
    }

    /// Get registered source count
    pub fn source_count(&self) -> usize {
        self.adapters.len()
    }

    /// Check whether the given source is listening
    pub fn is_source_listening(&self, source_id: &str) -> bool {
        self.adapters
            .get(source_id)
            .map(|a| a.is_listening())
            .unwrap_or(false)
    }
}

impl Drop for FeedPipeline {
    fn drop(&mut self) {
        self.stop_all();
    }
}
