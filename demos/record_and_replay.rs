//! Record and Replay Example
//!
//! Records a short mock session to JSONL through a recording listener, then
//! plays the file back through a replay source and counts what comes out.
//!
//! Run with: cargo run --bin record_and_replay

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use contracts::{FeedEvent, ListenerConfig, ListenerKind, MessageSource};
use dispatcher::{DispatcherConfig, create_dispatcher};
use ingestion::{FeedPipeline, MockFeed, MockFeedConfig, ReplayConfig, ReplayFeed};
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

    let record_dir = std::env::temp_dir().join("sensr-watch-demo");
    info!(dir = %record_dir.display(), "Starting Record and Replay Demo");

    // ==== Stage 1: Record a short mock session ====
    let recorded = record_session(&record_dir, 40).await?;
    info!(messages = recorded, "Recording finished");

    // ==== Stage 2: Play the recording back ====
    let replayed = replay_session(&record_dir.join("messages.jsonl")).await?;
    info!(messages = replayed, "Replay finished");

    if replayed == recorded {
        info!("Round trip complete: every recorded message was replayed");
    } else {
        tracing::warn!(recorded, replayed, "Round trip mismatch");
    }

    std::fs::remove_dir_all(&record_dir)?;
    Ok(())
}

/// Run a mock feed into a single recording listener until `target` messages
/// have been captured.
async fn record_session(dir: &Path, target: u64) -> Result<u64, Box<dyn std::error::Error>> {
    let mock = MockFeed::new(
        "mock_stream".to_string(),
        MockFeedConfig {
            frequency_hz: 100.0,
            ..Default::default()
        },
    );

    let mut feed = FeedPipeline::new(100);
    feed.register_source(Box::new(mock), None);

    let recorder = ListenerConfig {
        name: "recorder".to_string(),
        kind: ListenerKind::Recording,
        subscribe: None,
        queue_capacity: 100,
        params: HashMap::from([("dir".to_string(), dir.display().to_string())]),
    };
    let (dispatch_tx, dispatch_rx) = mpsc::channel::<FeedEvent>(100);
    let dispatcher = create_dispatcher(
        DispatcherConfig {
            listeners: vec![recorder],
        },
        dispatch_rx,
    )?;
    let dispatcher_handle = dispatcher.spawn();

    feed.start_all();
    let feed_rx = feed.take_receiver().expect("feed receiver already taken");

    let pump_handle = tokio::spawn(async move {
        let mut forwarded = 0u64;
        while let Ok(event) = feed_rx.recv().await {
            let is_message = matches!(event, FeedEvent::Message(_));
            if dispatch_tx.send(event).await.is_err() {
                break;
            }
            if is_message {
                forwarded += 1;
                if forwarded >= target {
                    break;
                }
            }
        }
        forwarded
    });

    let forwarded = tokio::time::timeout(Duration::from_secs(30), pump_handle).await??;
    feed.stop_all();

    // Recording listener flushes its writer and meta.json on shutdown
    tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await??;

    Ok(forwarded)
}

/// Load the recording and play it back at 20x, counting replayed messages.
async fn replay_session(path: &Path) -> Result<u64, Box<dyn std::error::Error>> {
    let replay = ReplayFeed::load(
        path,
        "replay".to_string(),
        ReplayConfig {
            speed: 20.0,
            loop_playback: false,
        },
    )?;
    info!(records = replay.record_count(), "Recording loaded");

    let counter = Arc::new(AtomicU64::new(0));
    let counter_clone = Arc::clone(&counter);
    replay.listen(Arc::new(move |event| {
        if matches!(event, FeedEvent::Message(_)) {
            counter_clone.fetch_add(1, Ordering::Relaxed);
        }
    }));

    // Replay runs on its own thread; poll until it reaches end of file
    for _ in 0..200 {
        if !replay.is_listening() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    replay.stop();

    Ok(counter.load(Ordering::Relaxed))
}
