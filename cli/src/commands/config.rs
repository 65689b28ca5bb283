// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use agent_relay_core::domain::gateway_config::{GatewayConfig, CONFIG_PATH_ENV};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./agent-relay.yaml")]
        output: PathBuf,

        /// Include every setting with comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  1. --config flag: {}", path.display()),
            None => println!("  1. --config flag: {}", "(not set)".dimmed()),
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./agent-relay.yaml");
        println!("  4. ~/.agent-relay/config.yaml");
        println!("  5. /etc/agent-relay/config.yaml");
        println!();
    }

    let config = GatewayConfig::load_or_default(config_override)
        .context("Failed to load configuration")?;

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Server:".bold());
    println!("  Listen: {}:{}", config.host, config.port);
    println!("  SPA directory: {}", config.resolved_spa_dir().display());
    if config.running_on_lambda {
        println!("  Running on Lambda: {}", "yes".green());
    }
    println!();

    println!("{}", "Agent runtime:".bold());
    println!("  Region: {}", config.region);
    println!(
        "  ARN parameter: {}",
        config
            .runtime_arn_param
            .as_deref()
            .map(|p| p.normal())
            .unwrap_or_else(|| "(not set)".red())
    );
    println!("  Parameter store: {}", config.parameter_store_endpoint());
    println!("  Invocation endpoint: {}", config.agent_runtime_endpoint());
    println!();

    println!("{}", "Observability:".bold());
    println!("  Log level: {}", config.observability.log_level);
    println!("  Log format: {}", config.observability.log_format);
    match config.observability.metrics_port {
        Some(port) => println!("  Metrics: 0.0.0.0:{}", port),
        None => println!("  Metrics: {}", "(disabled)".dimmed()),
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = GatewayConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    if config.runtime_arn_param.is_none() {
        println!(
            "{}",
            "! runtime_arn_param is not set; chat requests will fail".yellow()
        );
    }
    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml").to_string()
    } else {
        minimal_config()?
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

fn minimal_config() -> Result<String> {
    let mut config = GatewayConfig::default();
    config.runtime_arn_param = Some("/dev/agent-core-playground/agent-core/runtime-arn".into());
    serde_yaml::to_string(&config).context("Failed to serialize configuration")
}
