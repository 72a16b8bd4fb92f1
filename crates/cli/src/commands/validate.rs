//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{ServiceConfig, TransportKind};

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
    max_batch_size: usize,
    max_concurrent_workers: Option<usize>,
    timeout_ms: Option<u64>,
    transport: String,
    sender: String,
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

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
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
                    version: format!("{:?}", config.version),
                    max_batch_size: config.dispatch.max_batch_size,
                    max_concurrent_workers: config.dispatch.max_concurrent_workers,
                    timeout_ms: config.dispatch.timeout_ms,
                    transport: format!("{:?}", config.mailer.transport),
                    sender: config.mailer.sender.clone(),
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
fn collect_warnings(config: &ServiceConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.dispatch.max_concurrent_workers.is_none() {
        warnings.push(
            "dispatch.max_concurrent_workers not set - one worker per batch, all at once"
                .to_string(),
        );
    }

    if config.mailer.transport == TransportKind::Log {
        warnings.push("mailer.transport is log - messages are only logged".to_string());
    }

    if config.dispatch.timeout_ms.is_none() {
        warnings.push("dispatch.timeout_ms not set - a stuck transport blocks forever".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Max batch size: {}", summary.max_batch_size);
            match summary.max_concurrent_workers {
                Some(limit) => println!("  Max concurrent workers: {}", limit),
                None => println!("  Max concurrent workers: unbounded"),
            }
            if let Some(timeout_ms) = summary.timeout_ms {
                println!("  Timeout: {} ms", timeout_ms);
            }
            println!("  Transport: {}", summary.transport);
            println!("  Sender: {}", summary.sender);
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
