// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Gateway Configuration Types
//
// Defines the configuration schema for the relay process:
// - AWS region and the parameter-store key holding the agent runtime ARN
// - Listen address and the directory of the pre-built SPA
// - Optional endpoint overrides (local stacks, test doubles)
// - Logging and metrics settings
//
// Values come from a YAML file (optional) and are then overridden by the
// environment, which is how the function is configured when deployed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_REGION: &str = "ap-northeast-1";
pub const CONFIG_PATH_ENV: &str = "AGENT_RELAY_CONFIG_PATH";

/// Process configuration for the relay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// AWS region used for both signing and endpoint construction
    #[serde(default = "default_region")]
    pub region: String,

    /// Parameter store key holding the agent runtime ARN.
    /// Missing is not fatal at startup; each chat request reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_arn_param: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the built SPA. Unset means `./spa` on Lambda and
    /// `./dist/spa` elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spa_dir: Option<PathBuf>,

    #[serde(default)]
    pub endpoints: EndpointOverrides,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Set from `AWS_LAMBDA_FUNCTION_NAME`; never read from files
    #[serde(skip)]
    pub running_on_lambda: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointOverrides {
    /// Base URL replacing `https://ssm.{region}.amazonaws.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_store: Option<String>,

    /// Base URL replacing `https://bedrock-agentcore.{region}.amazonaws.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_runtime: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Prometheus listener port; disabled when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            metrics_port: None,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            runtime_arn_param: None,
            host: default_host(),
            port: default_port(),
            spa_dir: None,
            endpoints: EndpointOverrides::default(),
            observability: ObservabilityConfig::default(),
            running_on_lambda: false,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Candidate config locations, in precedence order
    pub fn discovery_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(path));
        }
        paths.push(PathBuf::from("./agent-relay.yaml"));
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".agent-relay").join("config.yaml"));
        }
        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/agent-relay/config.yaml"));
        paths
    }

    /// Discover configuration file using precedence order
    /// 1. AGENT_RELAY_CONFIG_PATH environment variable
    /// 2. ./agent-relay.yaml (working directory)
    /// 3. ~/.agent-relay/config.yaml (user home)
    /// 4. /etc/agent-relay/config.yaml (system, Unix)
    pub fn discover_config() -> Option<PathBuf> {
        Self::discovery_paths().into_iter().find(|p| p.exists())
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path must load
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            Self::from_yaml_file(config_path)?
        } else {
            tracing::debug!("No configuration file found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply process environment overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(region) = get("AWS_REGION") {
            self.region = region;
        }
        if let Some(param) = get("AGENT_RUNTIME_ARN_SSM_PARAM") {
            self.runtime_arn_param = Some(param);
        }
        if let Some(port) = get("PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!("Invalid value for PORT: '{}'. Ignoring.", port),
            }
        }
        if get("AWS_LAMBDA_FUNCTION_NAME").is_some() {
            self.running_on_lambda = true;
        }
        if let Some(dir) = get("AGENT_RELAY_SPA_DIR") {
            self.spa_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = get("AGENT_RELAY_SSM_ENDPOINT") {
            self.endpoints.parameter_store = Some(url);
        }
        if let Some(url) = get("AGENT_RELAY_AGENT_ENDPOINT") {
            self.endpoints.agent_runtime = Some(url);
        }
        if let Some(format) = get("AGENT_RELAY_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Some(port) = get("AGENT_RELAY_METRICS_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.observability.metrics_port = Some(port),
                Err(_) => tracing::warn!(
                    "Invalid value for AGENT_RELAY_METRICS_PORT: '{}'. Ignoring.",
                    port
                ),
            }
        }
    }

    /// Directory the static asset server reads from
    pub fn resolved_spa_dir(&self) -> PathBuf {
        match &self.spa_dir {
            Some(dir) => dir.clone(),
            None if self.running_on_lambda => PathBuf::from("spa"),
            None => PathBuf::from("dist").join("spa"),
        }
    }

    pub fn parameter_store_endpoint(&self) -> String {
        self.endpoints
            .parameter_store
            .clone()
            .unwrap_or_else(|| format!("https://ssm.{}.amazonaws.com", self.region))
    }

    pub fn agent_runtime_endpoint(&self) -> String {
        self.endpoints
            .agent_runtime
            .clone()
            .unwrap_or_else(|| format!("https://bedrock-agentcore.{}.amazonaws.com", self.region))
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.region.trim().is_empty() {
            anyhow::bail!("region must not be empty");
        }

        if self.port == 0 {
            anyhow::bail!("port must be non-zero");
        }

        for (name, url) in [
            ("endpoints.parameter_store", &self.endpoints.parameter_store),
            ("endpoints.agent_runtime", &self.endpoints.agent_runtime),
        ] {
            if let Some(url) = url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    anyhow::bail!("{} must be an http(s) URL, got '{}'", name, url);
                }
            }
        }

        match self.observability.log_format.as_str() {
            "text" | "json" => {}
            other => anyhow::bail!("Invalid log_format: '{}'. Must be 'text' or 'json'", other),
        }

        if let Some(param) = &self.runtime_arn_param {
            if !param.starts_with('/') {
                tracing::warn!("runtime_arn_param '{}' is not an absolute parameter path", param);
            }
        }

        Ok(())
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}
