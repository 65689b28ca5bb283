// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Agent Relay CLI
//!
//! The `agent-relay` binary hosts the chat relay and ships the tools around it.
//!
//! ## Commands
//!
//! - `agent-relay serve` - Run the HTTP relay (SPA + `/api/chat`)
//! - `agent-relay chat` - Terminal chat client against a running relay
//! - `agent-relay config show|validate|generate` - Configuration management
//! - `agent-relay infra synth` - Render the deployment template for a stage

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use agent_relay::commands::{self, ChatArgs, ConfigCommand, InfraCommand, ServeArgs};

/// Interactive commands stay quiet unless asked
const CLIENT_LOG_LEVEL: &str = "warn";

/// Agent Relay - signed streaming proxy to a managed agent runtime
#[derive(Parser)]
#[command(name = "agent-relay")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "AGENT_RELAY_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, env = "AGENT_RELAY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format (text, json)
    #[arg(long, global = true, env = "AGENT_RELAY_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay server
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Chat with an agent through a running relay
    #[command(name = "chat")]
    Chat(ChatArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Deployment declarations
    #[command(name = "infra")]
    Infra {
        #[command(subcommand)]
        command: InfraCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so clap's env fallbacks see it
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let level = cli.log_level.as_deref();
    let format = cli.log_format.as_deref();

    match cli.command {
        Commands::Serve(args) => {
            let config = commands::serve::load_config(cli.config, &args)?;
            init_logging(
                level.unwrap_or(&config.observability.log_level),
                format.unwrap_or(&config.observability.log_format),
            )?;
            commands::serve::run(config).await
        }
        Commands::Chat(args) => {
            init_logging(level.unwrap_or(CLIENT_LOG_LEVEL), format.unwrap_or("text"))?;
            commands::chat::run(args).await
        }
        Commands::Config { command } => {
            init_logging(level.unwrap_or(CLIENT_LOG_LEVEL), format.unwrap_or("text"))?;
            commands::config::handle_command(command, cli.config).await
        }
        Commands::Infra { command } => {
            init_logging(level.unwrap_or(CLIENT_LOG_LEVEL), format.unwrap_or("text"))?;
            commands::infra::handle_command(command).await
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        "json" => builder.json().init(),
        _ => builder.compact().init(),
    }

    Ok(())
}
