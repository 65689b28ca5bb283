// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Deployment declarations
//!
//! Commands: synth, names

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use agent_relay_core::infrastructure::deployment::{
    render_template, DeploymentConfig, StageName, DEFAULT_DEPLOY_REGION,
};

#[derive(Subcommand)]
pub enum InfraCommand {
    /// Render the CloudFormation template for a stage
    Synth {
        /// Deployment stage (dev, prd)
        #[arg(long, default_value = "dev")]
        stage: String,

        /// Target AWS account
        #[arg(long, env = "CDK_DEFAULT_ACCOUNT")]
        account: Option<String>,

        /// Target AWS region
        #[arg(long, env = "CDK_DEFAULT_REGION", default_value = DEFAULT_DEPLOY_REGION)]
        region: String,

        /// Write the template here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the resource names derived for a stage
    Names {
        #[arg(long, default_value = "dev")]
        stage: String,
    },
}

pub async fn handle_command(command: InfraCommand) -> Result<()> {
    match command {
        InfraCommand::Synth {
            stage,
            account,
            region,
            output,
        } => synth(&stage, account, &region, output),
        InfraCommand::Names { stage } => names(&stage),
    }
}

fn deployment(stage: &str, account: Option<String>, region: &str) -> Result<DeploymentConfig> {
    let stage: StageName = stage.parse()?;
    Ok(DeploymentConfig::for_stage(stage, account)?.with_region(region))
}

fn synth(stage: &str, account: Option<String>, region: &str, output: Option<PathBuf>) -> Result<()> {
    let config = deployment(stage, account, region)?;
    let template = serde_json::to_string_pretty(&render_template(&config))
        .context("Failed to serialize template")?;

    match output {
        Some(path) => {
            std::fs::write(&path, template + "\n")
                .with_context(|| format!("Failed to write template to {:?}", path))?;
            eprintln!(
                "{}",
                format!(
                    "✓ Template for stack {} written to {}",
                    config.stack_name(),
                    path.display()
                )
                .green()
            );
        }
        None => println!("{}", template),
    }
    Ok(())
}

fn names(stage: &str) -> Result<()> {
    let stage: StageName = stage.parse()?;
    // Names do not depend on the account
    let config = DeploymentConfig {
        stage,
        account: String::new(),
        region: DEFAULT_DEPLOY_REGION.to_string(),
    };

    println!("{}", format!("Stage {}:", stage).bold());
    println!("  Stack: {}", config.stack_name());
    println!("  Function: {}", config.function_name());
    println!("  Runtime ARN parameter: {}", config.runtime_arn_param());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_requires_valid_stage_and_account() {
        assert!(deployment("qa", Some("123456789012".into()), "us-east-1").is_err());
        assert!(deployment("dev", None, "us-east-1").is_err());

        let config = deployment("prd", Some("123456789012".into()), "us-east-1").unwrap();
        assert_eq!(config.stack_name(), "p-acp-main");
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn test_synth_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.json");

        synth("dev", Some("123456789012".into()), "ap-northeast-1", Some(path.clone())).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            written["Resources"]["Function"]["Properties"]["FunctionName"],
            "d-acp-web"
        );
    }
}
