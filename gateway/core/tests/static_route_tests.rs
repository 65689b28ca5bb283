// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use agent_relay_core::application::{ChatProxyService, RuntimeIdentifierCache};
use agent_relay_core::domain::errors::GatewayError;
use agent_relay_core::infrastructure::aws::{AgentRuntime, ParameterStore, UpstreamStream};
use agent_relay_core::infrastructure::static_assets::StaticAssetServer;
use agent_relay_core::presentation::api::{app, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct UnusedStore;

#[async_trait]
impl ParameterStore for UnusedStore {
    async fn get_parameter(&self, _name: &str) -> Result<String, GatewayError> {
        Err(GatewayError::Network("not expected".into()))
    }
}

struct UnusedRuntime;

#[async_trait]
impl AgentRuntime for UnusedRuntime {
    async fn invoke(&self, _arn: &str, _session: &str, _prompt: &str) -> Result<UpstreamStream, GatewayError> {
        Err(GatewayError::Network("not expected".into()))
    }
}

fn router(spa_dir: &Path) -> axum::Router {
    let cache = Arc::new(RuntimeIdentifierCache::new(Arc::new(UnusedStore), None));
    let chat = Arc::new(ChatProxyService::new(cache, Arc::new(UnusedRuntime)));
    app(AppState::new(chat, StaticAssetServer::new(spa_dir)))
}

fn spa_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>shell</html>").unwrap();
    std::fs::create_dir_all(dir.path().join("assets")).unwrap();
    std::fs::write(dir.path().join("assets/app.js"), "console.log(1)").unwrap();
    std::fs::write(dir.path().join("assets/app.css"), "body{}").unwrap();
    dir
}

async fn get(router: axum::Router, path: &str) -> (StatusCode, Option<String>, Option<String>, Vec<u8>) {
    let response = router
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let header_value = |name: header::HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let content_type = header_value(header::CONTENT_TYPE);
    let cache_control = header_value(header::CACHE_CONTROL);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, content_type, cache_control, body)
}

#[tokio::test]
async fn test_root_serves_index() {
    let dir = spa_fixture();

    let root = get(router(dir.path()), "/").await;
    let index = get(router(dir.path()), "/index.html").await;

    assert_eq!(root.0, StatusCode::OK);
    assert_eq!(root, index);
    assert_eq!(root.1.as_deref(), Some("text/html"));
    assert_eq!(root.2.as_deref(), Some("public, max-age=31536000"));
}

#[tokio::test]
async fn test_assets_get_their_content_type() {
    let dir = spa_fixture();

    let (status, content_type, _, body) = get(router(dir.path()), "/assets/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/javascript"));
    assert_eq!(body, b"console.log(1)");

    let (_, content_type, _, _) = get(router(dir.path()), "/assets/app.css").await;
    assert_eq!(content_type.as_deref(), Some("text/css"));
}

#[tokio::test]
async fn test_client_routes_fall_back_to_shell() {
    let dir = spa_fixture();

    let (status, content_type, _, body) = get(router(dir.path()), "/foo/bar").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/html"));
    assert_eq!(body, b"<html>shell</html>");

    // A directory is not a file
    let (_, _, _, body) = get(router(dir.path()), "/assets").await;
    assert_eq!(body, b"<html>shell</html>");
}

#[tokio::test]
async fn test_encoded_asset_names_are_served() {
    let dir = spa_fixture();
    std::fs::write(dir.path().join("assets/my app.js"), "spaced").unwrap();

    let (status, content_type, _, body) = get(router(dir.path()), "/assets/my%20app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/javascript"));
    assert_eq!(body, b"spaced");
}

#[tokio::test]
async fn test_get_on_chat_route_serves_shell() {
    let dir = spa_fixture();

    let (status, content_type, _, body) = get(router(dir.path()), "/api/chat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/html"));
    assert_eq!(body, b"<html>shell</html>");
}

#[tokio::test]
async fn test_missing_shell_is_404() {
    let dir = TempDir::new().unwrap();

    let (status, _, _, body) = get(router(dir.path()), "/foo/bar").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"Not Found");
}

#[tokio::test]
async fn test_health_reports_uptime() {
    let dir = TempDir::new().unwrap();

    let (status, content_type, _, body) = get(router(dir.path()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["uptime_seconds"].is_u64());
}
