//! Mock Session Example
//!
//! Demonstrates reading a blueprint, wiring mock stream sources, and fanning
//! out messages to listeners via the dispatcher. Runs without a SENSR
//! installation.
//!
//! Run with: cargo run --bin mock_session [config_path]

use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::{
    ClientBlueprint, ConfigVersion, FeedEvent, FeedSettings, ListenerConfig, ListenerKind,
    ListeningType, SourceConfig, SourceKind,
};
use dispatcher::{DispatcherConfig, create_dispatcher};
use ingestion::{BackpressureConfig, FeedPipeline, build_source};
use observability::StreamStatsAggregator;
use tokio::sync::mpsc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Mock Session Demo");

    // ==== Stage 1: Use default blueprint or load from file ====
    let blueprint = if let Some(path) = std::env::args().nth(1) {
        info!(path = %path, "Loading blueprint");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        demo_blueprint()
    };

    // ==== Stage 2: Create Dispatcher with listeners from the blueprint ====
    let (dispatch_tx, dispatch_rx) = mpsc::channel::<FeedEvent>(100);
    let dispatcher = create_dispatcher(
        DispatcherConfig {
            listeners: blueprint.listeners.clone(),
        },
        dispatch_rx,
    )?;
    let listener_metrics = dispatcher.metrics();
    let dispatcher_handle = dispatcher.spawn();

    // ==== Stage 3: Start sources described by the blueprint ====
    let mut feed = FeedPipeline::with_config(BackpressureConfig::new(
        blueprint.feed.channel_capacity,
        blueprint.feed.drop_policy,
    ));
    for source_config in &blueprint.sources {
        let source = build_source(source_config)?;
        info!(source_id = %source_config.id, kind = ?source_config.kind, "Registered source");
        feed.register_source(source, None);
    }

    feed.start_all();
    let feed_rx = feed.take_receiver().expect("feed receiver already taken");

    // ==== Stage 4: Pump events into the dispatcher ====
    let target_messages = 50u64;
    info!(target_messages, "Running session");

    let pump_handle = tokio::spawn(async move {
        let mut aggregator = StreamStatsAggregator::new();
        let mut messages = 0u64;

        while let Ok(event) = feed_rx.recv().await {
            if let FeedEvent::Message(message) = &event {
                aggregator.update(message);
                messages += 1;
            }
            if dispatch_tx.send(event).await.is_err() {
                break;
            }
            if messages >= target_messages {
                break;
            }
        }
        aggregator
    });

    let result = tokio::time::timeout(Duration::from_secs(30), pump_handle).await;

    // ==== Stage 5: Cleanup ====
    info!("Shutting down...");
    feed.stop_all();
    let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;

    match result {
        Ok(Ok(aggregator)) => {
            print!("{}", aggregator.summary());
            for (name, metrics) in &listener_metrics {
                let snapshot = metrics.snapshot();
                info!(
                    listener = %name,
                    delivered = snapshot.delivered_count,
                    skipped = snapshot.skipped_count,
                    dropped = snapshot.dropped_count,
                    "Listener delivery"
                );
            }
        }
        Ok(Err(e)) => tracing::warn!("Pump error: {:?}", e),
        Err(_) => tracing::warn!("Session timed out"),
    }

    Ok(())
}

fn demo_blueprint() -> ClientBlueprint {
    use std::collections::HashMap;

    ClientBlueprint {
        version: ConfigVersion::V1,
        feed: FeedSettings::default(),
        sources: vec![SourceConfig {
            id: "mock_stream".to_string(),
            kind: SourceKind::Mock,
            frequency_hz: 20.0,
            emit: ListeningType::all(),
            params: HashMap::new(),
        }],
        listeners: vec![
            ListenerConfig {
                name: "console".to_string(),
                kind: ListenerKind::Log,
                subscribe: None,
                queue_capacity: 100,
                params: HashMap::new(),
            },
            ListenerConfig {
                name: "points".to_string(),
                kind: ListenerKind::PointStats,
                subscribe: None,
                queue_capacity: 100,
                params: HashMap::new(),
            },
        ],
    }
}
