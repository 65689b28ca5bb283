// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Agent Runtime Adapter
//
// Invokes a hosted agent runtime and hands back the response body as an
// unconsumed byte stream. The body is never buffered here: whoever polls the
// stream sets the pace, and dropping it closes the upstream connection.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, warn};

use super::encode_uri_component;
use super::signer::{DraftRequest, SigV4Signer};
use crate::domain::chat::InvocationPayload;
use crate::domain::errors::GatewayError;

pub const SESSION_ID_HEADER: &str = "X-Amzn-Bedrock-AgentCore-Runtime-Session-Id";

/// Upstream event body, chunk by chunk
pub type UpstreamStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

/// Streaming agent invocation endpoint
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn invoke(
        &self,
        runtime_arn: &str,
        session_id: &str,
        prompt: &str,
    ) -> Result<UpstreamStream, GatewayError>;
}

pub struct AgentCoreRuntimeClient {
    client: reqwest::Client,
    signer: SigV4Signer,
    endpoint: String,
}

impl AgentCoreRuntimeClient {
    /// `signer` must target service "bedrock-agentcore"
    pub fn new(client: reqwest::Client, signer: SigV4Signer, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            signer,
            endpoint: endpoint.into(),
        }
    }

    pub fn invocation_path(runtime_arn: &str) -> String {
        format!("/runtimes/{}/invocations", encode_uri_component(runtime_arn))
    }
}

#[async_trait]
impl AgentRuntime for AgentCoreRuntimeClient {
    async fn invoke(
        &self,
        runtime_arn: &str,
        session_id: &str,
        prompt: &str,
    ) -> Result<UpstreamStream, GatewayError> {
        let payload = serde_json::to_vec(&InvocationPayload {
            prompt: prompt.to_string(),
        })
        .map_err(|e| GatewayError::Signing(format!("Failed to encode payload: {}", e)))?;

        let draft = DraftRequest::for_endpoint("POST", &self.endpoint, &Self::invocation_path(runtime_arn))?
            .header("Content-Type", "application/json")
            .header("Accept", "application/x-ndjson")
            .header(SESSION_ID_HEADER, session_id)
            .body(payload);

        let signed = self.signer.sign(&draft).await?;
        debug!(session_id, url = %signed.url, "Invoking agent runtime");

        let response = signed.into_reqwest(&self.client)?.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(session_id, status = status.as_u16(), "Agent runtime rejected invocation");
            return Err(GatewayError::upstream("AgentCore", status.as_u16(), error_text));
        }

        Ok(response.bytes_stream().boxed())
    }
}
