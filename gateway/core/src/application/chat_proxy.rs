// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Chat Proxy Service
//!
//! Per-request pipeline behind `POST /api/chat`:
//!
//! 1. validate the submission
//! 2. resolve the runtime identifier (cached)
//! 3. build and sign the invocation
//! 4. dispatch; a non-success upstream status becomes an error
//!
//! Relaying the resulting stream is left to the HTTP layer. Every failure up
//! to that point happens before any response byte is written, so it can still
//! be turned into a JSON error. Nothing is retried.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Orchestrates the signed streaming proxy

use std::sync::Arc;
use tracing::{error, info};

use super::runtime_cache::RuntimeIdentifierCache;
use crate::domain::chat::ChatRequest;
use crate::domain::errors::GatewayError;
use crate::infrastructure::aws::{AgentRuntime, UpstreamStream};

pub struct ChatProxyService {
    runtime_ids: Arc<RuntimeIdentifierCache>,
    runtime: Arc<dyn AgentRuntime>,
}

impl ChatProxyService {
    pub fn new(runtime_ids: Arc<RuntimeIdentifierCache>, runtime: Arc<dyn AgentRuntime>) -> Self {
        Self {
            runtime_ids,
            runtime,
        }
    }

    pub async fn start(&self, request: &ChatRequest) -> Result<UpstreamStream, GatewayError> {
        if let Err(e) = request.validate() {
            metrics::counter!("agent_relay_chat_requests_total", "outcome" => "rejected")
                .increment(1);
            return Err(e);
        }

        match self.dispatch(request).await {
            Ok(stream) => {
                info!(session_id = %request.session_id, "Relaying agent stream");
                metrics::counter!("agent_relay_chat_requests_total", "outcome" => "streaming")
                    .increment(1);
                Ok(stream)
            }
            Err(e) => {
                error!(session_id = %request.session_id, error = %e, "AgentCore error");
                metrics::counter!("agent_relay_chat_requests_total", "outcome" => "failed")
                    .increment(1);
                Err(e)
            }
        }
    }

    async fn dispatch(&self, request: &ChatRequest) -> Result<UpstreamStream, GatewayError> {
        let runtime_arn = self.runtime_ids.get_or_fetch().await?;
        self.runtime
            .invoke(&runtime_arn, &request.session_id, &request.message)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::aws::ParameterStore;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::StreamExt;
    use parking_lot::Mutex;

    struct FixedStore(Result<String, GatewayError>);

    #[async_trait]
    impl ParameterStore for FixedStore {
        async fn get_parameter(&self, _name: &str) -> Result<String, GatewayError> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct RecordingRuntime {
        calls: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl AgentRuntime for RecordingRuntime {
        async fn invoke(
            &self,
            runtime_arn: &str,
            session_id: &str,
            prompt: &str,
        ) -> Result<UpstreamStream, GatewayError> {
            self.calls
                .lock()
                .push((runtime_arn.into(), session_id.into(), prompt.into()));
            let chunks: Vec<Result<Bytes, reqwest::Error>> =
                vec![Ok(Bytes::from_static(b"data: {\"event\":\"complete\"}\n"))];
            Ok(futures::stream::iter(chunks).boxed())
        }
    }

    fn service(store: FixedStore) -> (ChatProxyService, Arc<RecordingRuntime>) {
        let runtime = Arc::new(RecordingRuntime::default());
        let cache = Arc::new(RuntimeIdentifierCache::new(
            Arc::new(store),
            Some("/dev/p".into()),
        ));
        (ChatProxyService::new(cache, runtime.clone()), runtime)
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_upstream() {
        let (svc, runtime) = service(FixedStore(Ok("arn:x".into())));
        let err = svc.start(&ChatRequest::new("", "s1")).await.err().unwrap();
        assert_eq!(err.status_code(), 400);
        assert!(runtime.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_forwards_resolved_arn_session_and_prompt() {
        let (svc, runtime) = service(FixedStore(Ok("arn:x".into())));
        let mut stream = svc.start(&ChatRequest::new("hello", "s1")).await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert!(first.starts_with(b"data:"));

        let calls = runtime.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            ("arn:x".to_string(), "s1".to_string(), "hello".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolution_failure_is_surfaced() {
        let (svc, runtime) = service(FixedStore(Err(GatewayError::InvalidResponse(
            "AgentCore Runtime ARN not found in SSM".into(),
        ))));
        let err = svc.start(&ChatRequest::new("hello", "s1")).await.err().unwrap();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("not found in SSM"));
        assert!(runtime.calls.lock().is_empty());
    }
}
