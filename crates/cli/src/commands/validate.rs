//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    channel_capacity: usize,
    drop_policy: String,
    source_count: usize,
    listener_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    channel_capacity: blueprint.feed.channel_capacity,
                    drop_policy: format!("{:?}", blueprint.feed.drop_policy),
                    source_count: blueprint.sources.len(),
                    listener_count: blueprint.listeners.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::ClientBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    // Check for empty listeners
    if blueprint.listeners.is_empty() {
        warnings.push("No listeners configured - stream messages will be dropped".to_string());
    }

    for listener in &blueprint.listeners {
        // An explicit subscribe on a fixed-mask kind is ignored
        if listener.subscribe.is_some() && !listener.kind.mask_overridable() {
            warnings.push(format!(
                "Listener '{}' sets 'subscribe' but kind {:?} has a fixed mask - the override is ignored",
                listener.name, listener.kind
            ));
        }

        if listener.effective_subscription().is_empty() {
            warnings.push(format!(
                "Listener '{}' has an empty subscription mask - it will only receive faults",
                listener.name
            ));
        }
    }

    for source in &blueprint.sources {
        if source.emit.is_empty() {
            warnings.push(format!(
                "Source '{}' has an empty emit mask - it will produce no messages",
                source.id
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Feed capacity: {}", summary.channel_capacity);
            println!("  Drop policy: {}", summary.drop_policy);
            println!("  Sources: {}", summary.source_count);
            println!("  Listeners: {}", summary.listener_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
