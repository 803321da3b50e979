//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    feed: FeedInfo,
    sources: Vec<SourceInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    listeners: Vec<ListenerInfo>,
}

#[derive(Serialize)]
struct FeedInfo {
    channel_capacity: usize,
    drop_policy: String,
}

#[derive(Serialize)]
struct SourceInfo {
    id: String,
    kind: String,
    frequency_hz: f64,
    emit: contracts::ListeningType,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

#[derive(Serialize)]
struct ListenerInfo {
    name: String,
    kind: String,
    subscription: contracts::ListeningType,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::ClientBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sources = blueprint
        .sources
        .iter()
        .map(|s| SourceInfo {
            id: s.id.clone(),
            kind: format!("{:?}", s.kind),
            frequency_hz: s.frequency_hz,
            emit: s.emit,
            params: if args.sources {
                s.params.clone()
            } else {
                Default::default()
            },
        })
        .collect();

    let listeners = if args.listeners {
        blueprint
            .listeners
            .iter()
            .map(|l| ListenerInfo {
                name: l.name.clone(),
                kind: format!("{:?}", l.kind),
                subscription: l.effective_subscription(),
                queue_capacity: l.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        feed: FeedInfo {
            channel_capacity: blueprint.feed.channel_capacity,
            drop_policy: format!("{:?}", blueprint.feed.drop_policy),
        },
        sources,
        listeners,
    }
}

fn print_config_info(blueprint: &contracts::ClientBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                SENSR Watch Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Feed settings
    println!("📡 Feed");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Channel capacity: {}", blueprint.feed.channel_capacity);
    println!("   └─ Drop policy: {:?}", blueprint.feed.drop_policy);

    // Sources
    println!("\n📥 Sources ({})", blueprint.sources.len());
    for (i, source) in blueprint.sources.iter().enumerate() {
        let is_last = i == blueprint.sources.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!(
            "   {} {} ({:?}, {} Hz)",
            prefix, source.id, source.kind, source.frequency_hz
        );
        println!("   {}  ├─ Emits: {:?}", child_prefix, source.emit);

        if args.sources && !source.params.is_empty() {
            println!("   {}  └─ Params:", child_prefix);
            for (key, value) in &source.params {
                println!("   {}       {} = {}", child_prefix, key, value);
            }
        } else {
            println!("   {}  └─ {} params", child_prefix, source.params.len());
        }
    }

    // Listeners
    if !blueprint.listeners.is_empty() {
        println!("\n📤 Listeners ({})", blueprint.listeners.len());
        for (i, listener) in blueprint.listeners.iter().enumerate() {
            let is_last = i == blueprint.listeners.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };

            if args.listeners {
                println!(
                    "   {} {} ({:?}, queue {}, subscribes {:?})",
                    prefix,
                    listener.name,
                    listener.kind,
                    listener.queue_capacity,
                    listener.effective_subscription()
                );
            } else {
                println!("   {} {} ({:?})", prefix, listener.name, listener.kind);
            }
        }
    }

    println!();
}
