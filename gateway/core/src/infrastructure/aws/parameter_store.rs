// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// SSM Parameter Store Adapter
//
// Single operation: AmazonSSM.GetParameter over the JSON 1.1 protocol,
// signed for service "ssm".

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::signer::{DraftRequest, SigV4Signer};
use crate::domain::errors::GatewayError;

/// Key-value configuration store
#[async_trait]
pub trait ParameterStore: Send + Sync {
    async fn get_parameter(&self, name: &str) -> Result<String, GatewayError>;
}

#[derive(Deserialize)]
struct GetParameterResponse {
    #[serde(rename = "Parameter")]
    parameter: Option<ParameterBody>,
}

#[derive(Deserialize)]
struct ParameterBody {
    #[serde(rename = "Value")]
    value: Option<String>,
}

pub struct SsmParameterStore {
    client: reqwest::Client,
    signer: SigV4Signer,
    endpoint: String,
}

impl SsmParameterStore {
    /// `signer` must target service "ssm"; `endpoint` is the scheme://host base URL
    pub fn new(client: reqwest::Client, signer: SigV4Signer, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            signer,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<String, GatewayError> {
        let body = serde_json::json!({ "Name": name }).to_string();
        let draft = DraftRequest::for_endpoint("POST", &self.endpoint, "/")?
            .header("Content-Type", "application/x-amz-json-1.1")
            .header("X-Amz-Target", "AmazonSSM.GetParameter")
            .body(body);

        let signed = self.signer.sign(&draft).await?;
        debug!(parameter = name, url = %signed.url, "Fetching parameter");

        let response = signed.into_reqwest(&self.client)?.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::upstream("SSM GetParameter", status, error_text));
        }

        let parsed: GetParameterResponse = response.json().await.map_err(|e| {
            GatewayError::InvalidResponse(format!("Failed to parse SSM response: {}", e))
        })?;

        parsed
            .parameter
            .and_then(|p| p.value)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                GatewayError::InvalidResponse("AgentCore Runtime ARN not found in SSM".to_string())
            })
    }
}
