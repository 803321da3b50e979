//! `run` command implementation.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

use contracts::{ListeningType, SourceConfig, SourceKind};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Session, SessionConfig};

/// Execute the `run` command
pub async fn run_session(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref path) = args.replay {
        info!(path = %path.display(), "Overriding sources with replay from CLI");
        blueprint.sources = vec![replay_source(args, path)];
    }

    info!(
        sources = blueprint.sources.len(),
        listeners = blueprint.listeners.len(),
        feed_capacity = blueprint.feed.channel_capacity,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build session configuration
    let session_config = SessionConfig {
        blueprint,
        max_messages: if args.max_messages == 0 {
            None
        } else {
            Some(args.max_messages)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run session
    let session = Session::new(session_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting session...");

    // Run session with shutdown signal
    tokio::select! {
        result = session.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        messages = stats.messages_received,
                        faults = stats.faults_received,
                        duration_secs = stats.duration.as_secs_f64(),
                        rate = format!("{:.2}", stats.message_rate()),
                        "Session completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Session execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping session...");
        }
    }

    info!("SENSR Watch finished");
    Ok(())
}

/// Build a replay source from CLI arguments
fn replay_source(args: &RunArgs, path: &std::path::Path) -> SourceConfig {
    let mut params = HashMap::new();
    params.insert("path".to_string(), path.display().to_string());
    params.insert("speed".to_string(), args.replay_speed.to_string());
    params.insert("loop".to_string(), args.replay_loop.to_string());

    SourceConfig {
        id: "replay".to_string(),
        kind: SourceKind::Replay,
        frequency_hz: 10.0,
        emit: ListeningType::all(),
        params,
    }
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::ClientBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Feed:");
    println!("  Capacity: {}", blueprint.feed.channel_capacity);
    println!("  Drop policy: {:?}", blueprint.feed.drop_policy);

    println!("\nSources ({}):", blueprint.sources.len());
    for source in &blueprint.sources {
        println!(
            "  - {} ({:?}) - emits {:?}",
            source.id, source.kind, source.emit
        );
    }

    if !blueprint.listeners.is_empty() {
        println!("\nListeners ({}):", blueprint.listeners.len());
        for listener in &blueprint.listeners {
            println!(
                "  - {} ({:?}) - subscribes {:?}",
                listener.name,
                listener.kind,
                listener.effective_subscription()
            );
        }
    }

    println!();
}
