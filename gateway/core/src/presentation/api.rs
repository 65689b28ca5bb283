// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::TryStreamExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::application::{ChatProxyService, RuntimeIdentifierCache};
use crate::domain::chat::{ChatRequest, MISSING_FIELDS_MESSAGE};
use crate::domain::credentials::CredentialProvider;
use crate::domain::errors::GatewayError;
use crate::domain::gateway_config::GatewayConfig;
use crate::infrastructure::aws::{
    AgentCoreRuntimeClient, SigV4Signer, SsmParameterStore, UpstreamStream,
};
use crate::infrastructure::static_assets::StaticAssetServer;

pub struct AppState {
    pub chat: Arc<ChatProxyService>,
    pub assets: StaticAssetServer,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(chat: Arc<ChatProxyService>, assets: StaticAssetServer) -> Self {
        Self {
            chat,
            assets,
            start_time: Instant::now(),
        }
    }

    /// Wire the production adapters. The runtime identifier cache is built
    /// here, once, and shared by every request.
    pub fn from_config(config: &GatewayConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        let client = reqwest::Client::new();

        let store = SsmParameterStore::new(
            client.clone(),
            SigV4Signer::new(credentials.clone(), &config.region, "ssm"),
            config.parameter_store_endpoint(),
        );
        let runtime = AgentCoreRuntimeClient::new(
            client,
            SigV4Signer::new(credentials, &config.region, "bedrock-agentcore"),
            config.agent_runtime_endpoint(),
        );

        let cache = Arc::new(RuntimeIdentifierCache::new(
            Arc::new(store),
            config.runtime_arn_param.clone(),
        ));
        let chat = Arc::new(ChatProxyService::new(cache, Arc::new(runtime)));

        Self::new(chat, StaticAssetServer::new(config.resolved_spa_dir()))
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler).get(static_handler))
        .route("/health", get(health_handler))
        .route("/", get(static_handler))
        .route("/{*path}", get(static_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected chat body: {}", rejection.body_text());
            return GatewayError::Validation(MISSING_FIELDS_MESSAGE.to_string()).into_response();
        }
    };

    match state.chat.start(&request).await {
        Ok(stream) => event_stream_response(stream, request.session_id),
        Err(e) => e.into_response(),
    }
}

/// Relay the upstream body chunk by chunk. Hyper polls the stream only when
/// the client connection can take more, and dropping the body (client gone)
/// drops the upstream response and its connection.
fn event_stream_response(stream: UpstreamStream, session_id: String) -> Response {
    let stream = stream.inspect_err(move |e| {
        warn!(session_id = %session_id, error = %e, "Upstream stream ended early");
    });

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    (headers, Body::from_stream(stream)).into_response()
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

async fn static_handler(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    match state.assets.resolve(uri.path()).await {
        Some(asset) => (
            [
                (header::CONTENT_TYPE, asset.content_type),
                (header::CACHE_CONTROL, asset.cache_control),
            ],
            asset.body,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}
