// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Relay server
//!
//! Loads configuration, resolves AWS credentials through the default chain
//! and serves the router from `agent_relay_core::presentation::api` until
//! Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Args;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use agent_relay_core::domain::gateway_config::GatewayConfig;
use agent_relay_core::infrastructure::aws::DefaultChainCredentialProvider;
use agent_relay_core::presentation::api::{app, AppState};

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Bind address (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides config and PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding the built SPA (overrides config)
    #[arg(long, value_name = "DIR")]
    pub spa_dir: Option<PathBuf>,
}

/// File, then environment, then flags
pub fn load_config(config_path: Option<PathBuf>, args: &ServeArgs) -> Result<GatewayConfig> {
    let mut config =
        GatewayConfig::load_or_default(config_path).context("Failed to load configuration")?;
    apply_args(&mut config, args);
    Ok(config)
}

fn apply_args(config: &mut GatewayConfig, args: &ServeArgs) {
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = &args.spa_dir {
        config.spa_dir = Some(dir.clone());
    }
}

pub async fn run(config: GatewayConfig) -> Result<()> {
    config
        .validate()
        .context("Configuration validation failed")?;

    info!(
        region = %config.region,
        spa_dir = %config.resolved_spa_dir().display(),
        lambda = config.running_on_lambda,
        "Agent relay starting"
    );
    if config.runtime_arn_param.is_none() {
        warn!("AGENT_RUNTIME_ARN_SSM_PARAM is not set; chat requests will fail until it is");
    }

    if let Some(port) = config.observability.metrics_port {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to start Prometheus exporter")?;
        info!("Metrics exporter listening on {}", addr);
    }

    let credentials = DefaultChainCredentialProvider::load(&config.region)
        .await
        .context("Failed to initialize AWS credentials")?;
    let state = AppState::from_config(&config, Arc::new(credentials));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Relay listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Relay shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut config = GatewayConfig::default();
        apply_args(
            &mut config,
            &ServeArgs {
                host: Some("127.0.0.1".into()),
                port: Some(8080),
                spa_dir: Some(PathBuf::from("/srv/spa")),
            },
        );
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.resolved_spa_dir(), PathBuf::from("/srv/spa"));
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let mut config = GatewayConfig::default();
        apply_args(&mut config, &ServeArgs::default());
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert!(config.spa_dir.is_none());
    }

    #[test]
    fn test_load_explicit_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.yaml");
        std::fs::write(&path, "region: us-west-2\nport: 4000\n").unwrap();

        let config = load_config(
            Some(path),
            &ServeArgs {
                port: Some(5000),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(config.port, 5000);
    }
}
