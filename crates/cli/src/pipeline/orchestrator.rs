//! Session orchestrator - coordinates all components.
//!
//! Wires the feed pipeline into the dispatcher and pumps events between
//! them until the feed drains, a limit is hit, or a shutdown arrives.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{ClientBlueprint, FeedEvent};
use ingestion::{BackpressureConfig, FeedPipeline};
use observability::{
    record_event_dispatched, record_fault, record_feed_depth, record_listener_queue_depth,
    record_stream_message,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::SessionStats;
use crate::error::CliError;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The client blueprint configuration
    pub blueprint: ClientBlueprint,

    /// Maximum number of messages to process (None = unlimited)
    pub max_messages: Option<u64>,

    /// Session timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Channel buffer size for the dispatcher input
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main session orchestrator
pub struct Session {
    config: SessionConfig,
}

impl Session {
    /// Create a new session with the given configuration
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run the session to completion
    pub async fn run(self) -> Result<SessionStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Setup Feed Pipeline
        info!("Setting up feed pipeline...");
        let mut feed = FeedPipeline::with_config(BackpressureConfig::new(
            blueprint.feed.channel_capacity,
            blueprint.feed.drop_policy,
        ));

        let mut active_sources = 0usize;
        for source_config in &blueprint.sources {
            let source = ingestion::build_source(source_config)
                .with_context(|| format!("Failed to build source '{}'", source_config.id))?;
            feed.register_source(source, None);
            active_sources += 1;
        }

        info!(active_sources, "Feed pipeline configured");

        // Setup Dispatcher
        info!("Setting up dispatcher...");
        let (dispatch_tx, dispatch_rx) = mpsc::channel::<FeedEvent>(self.config.buffer_size);

        if blueprint.listeners.is_empty() {
            warn!("No listeners configured - stream messages will be dropped");
        }

        let dispatcher_config = dispatcher::DispatcherConfig {
            listeners: blueprint.listeners.clone(),
        };
        let dispatcher = dispatcher::create_dispatcher(dispatcher_config, dispatch_rx)
            .context("Failed to create dispatcher")?;

        let listener_metrics = dispatcher.metrics();
        let active_listeners = listener_metrics.len();
        let dispatcher_handle = dispatcher.spawn();

        info!(active_listeners, "Dispatcher started");

        // Start Sources
        info!("Starting message sources...");
        feed.start_all();
        let feed_rx = feed
            .take_receiver()
            .ok_or_else(|| CliError::session_execution("feed receiver already taken"))?;

        // Periodic queue depth exporter
        let exporter_metrics = listener_metrics.clone();
        let exporter = tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(1));
            loop {
                tick.tick().await;
                for (name, metrics) in &exporter_metrics {
                    record_listener_queue_depth(name, metrics.queue_len());
                }
            }
        });

        let max_messages = self.config.max_messages;

        info!(max_messages = ?max_messages, "Session running");

        // Event pump task
        let pump_task = async move {
            let mut stats = SessionStats {
                active_sources,
                active_listeners,
                ..Default::default()
            };

            while let Ok(event) = feed_rx.recv().await {
                record_feed_depth(feed_rx.len());

                match &event {
                    FeedEvent::Message(message) => {
                        stats.messages_received += 1;
                        record_stream_message(message);
                        stats.stream_stats.update(message);

                        info!(
                            category = message.category_label(),
                            timestamp = format!("{:.3}", message.timestamp()),
                            "Stream message received"
                        );
                    }
                    FeedEvent::Fault(error) => {
                        stats.faults_received += 1;
                        record_fault(error.kind());
                        stats.stream_stats.record_fault(error.kind());

                        warn!(
                            kind = error.kind(),
                            error = %error,
                            "Stream fault received"
                        );
                    }
                }

                let label = event.label();
                if dispatch_tx.send(event).await.is_err() {
                    warn!("Dispatcher channel closed");
                    break;
                }
                record_event_dispatched(label);

                // Check max messages limit
                if let Some(max) = max_messages {
                    if stats.messages_received >= max {
                        info!(messages = stats.messages_received, "Reached max messages limit");
                        break;
                    }
                }
            }

            stats
        };

        // Run with optional timeout
        let stats = if let Some(timeout) = self.config.timeout {
            match tokio::time::timeout(timeout, pump_task).await {
                Ok(stats) => stats,
                Err(_) => {
                    warn!(timeout_secs = timeout.as_secs(), "Session timed out");
                    SessionStats::default()
                }
            }
        } else {
            pump_task.await
        };

        // Shutdown
        info!("Shutting down session...");
        feed.stop_all();
        exporter.abort();

        // Wait for dispatcher to flush
        let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;

        let mut final_stats = stats;
        final_stats.duration = start_time.elapsed();
        final_stats.listener_stats = listener_metrics
            .iter()
            .map(|(name, metrics)| (name.clone(), metrics.snapshot()))
            .collect();

        info!(
            duration_secs = final_stats.duration.as_secs_f64(),
            rate = format!("{:.2}", final_stats.message_rate()),
            "Session shutdown complete"
        );

        Ok(final_stats)
    }
}
