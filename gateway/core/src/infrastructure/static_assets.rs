// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Static Asset Server
//!
//! Serves the pre-built single-page application. Unknown paths fall back to
//! `index.html` so the client-side router can handle them.
//!
//! Request paths are joined onto the base directory. A path with a `..`
//! segment never reaches the filesystem and gets the shell instead. No
//! directory listings are produced.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** SPA file serving with shell fallback

use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub const LONG_LIVED_CACHE: &str = "public, max-age=31536000";

/// A file ready to be written to the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAsset {
    pub body: Vec<u8>,
    pub content_type: &'static str,
    pub cache_control: &'static str,
}

/// Content type from the file extension (case-insensitive)
pub fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html") => "text/html",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone)]
pub struct StaticAssetServer {
    base_dir: PathBuf,
}

impl StaticAssetServer {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a request path to an asset: the file itself, else the SPA
    /// shell, else `None` (the caller answers 404). `request_path` is the raw
    /// URI path and is percent-decoded here.
    pub async fn resolve(&self, request_path: &str) -> Option<StaticAsset> {
        let request_path = if request_path == "/" {
            "/index.html"
        } else {
            request_path
        };

        if let Some(relative) = decode_relative(request_path) {
            if let Some(asset) = read_asset(&self.base_dir.join(relative)).await {
                return Some(asset);
            }
        }

        debug!(path = request_path, "Asset not found, falling back to index.html");
        read_asset(&self.base_dir.join("index.html")).await
    }
}

/// Decoded path below the base directory, `None` when it is not valid UTF-8
/// or would leave the base directory.
fn decode_relative(request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    let relative = PathBuf::from(decoded.trim_start_matches('/'));
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    (!escapes).then_some(relative)
}

async fn read_asset(path: &Path) -> Option<StaticAsset> {
    // Directories count as missing.
    let metadata = tokio::fs::metadata(path).await.ok()?;
    if !metadata.is_file() {
        return None;
    }
    let body = tokio::fs::read(path).await.ok()?;
    Some(StaticAsset {
        body,
        content_type: mime_type(path),
        cache_control: LONG_LIVED_CACHE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spa_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>shell</html>").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets").join("app.js"), "console.log(1)").unwrap();
        dir
    }

    #[test]
    fn test_mime_table() {
        assert_eq!(mime_type(Path::new("a/index.HTML")), "text/html");
        assert_eq!(mime_type(Path::new("a.js")), "application/javascript");
        assert_eq!(mime_type(Path::new("a.svg")), "image/svg+xml");
        assert_eq!(mime_type(Path::new("a.jpeg")), "application/octet-stream");
        assert_eq!(mime_type(Path::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let dir = spa_dir();
        let server = StaticAssetServer::new(dir.path());
        let root = server.resolve("/").await.unwrap();
        let index = server.resolve("/index.html").await.unwrap();
        assert_eq!(root, index);
        assert_eq!(root.content_type, "text/html");
        assert_eq!(root.cache_control, LONG_LIVED_CACHE);
    }

    #[tokio::test]
    async fn test_existing_file_served_with_its_type() {
        let dir = spa_dir();
        let server = StaticAssetServer::new(dir.path());
        let asset = server.resolve("/assets/app.js").await.unwrap();
        assert_eq!(asset.body, b"console.log(1)");
        assert_eq!(asset.content_type, "application/javascript");
    }

    #[tokio::test]
    async fn test_percent_encoded_names_are_decoded() {
        let dir = spa_dir();
        std::fs::write(dir.path().join("my file.js"), "spaced").unwrap();
        std::fs::write(dir.path().join("café.css"), "accented").unwrap();
        let server = StaticAssetServer::new(dir.path());

        let asset = server.resolve("/my%20file.js").await.unwrap();
        assert_eq!(asset.body, b"spaced");
        assert_eq!(asset.content_type, "application/javascript");

        let asset = server.resolve("/caf%C3%A9.css").await.unwrap();
        assert_eq!(asset.body, b"accented");
    }

    #[tokio::test]
    async fn test_unknown_path_and_directory_fall_back_to_shell() {
        let dir = spa_dir();
        let server = StaticAssetServer::new(dir.path());
        let asset = server.resolve("/foo/bar").await.unwrap();
        assert_eq!(asset.body, b"<html>shell</html>");

        let asset = server.resolve("/assets").await.unwrap();
        assert_eq!(asset.body, b"<html>shell</html>");
    }

    #[tokio::test]
    async fn test_parent_segments_get_the_shell() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("secret.txt"), "secret").unwrap();
        let spa = root.path().join("spa");
        std::fs::create_dir(&spa).unwrap();
        std::fs::write(spa.join("index.html"), "<html>shell</html>").unwrap();

        let server = StaticAssetServer::new(&spa);
        let asset = server.resolve("/../secret.txt").await.unwrap();
        assert_eq!(asset.body, b"<html>shell</html>");

        let asset = server.resolve("/%2e%2e/secret.txt").await.unwrap();
        assert_eq!(asset.body, b"<html>shell</html>");

        let asset = server.resolve("/%2E%2E%2Fsecret.txt").await.unwrap();
        assert_eq!(asset.body, b"<html>shell</html>");
    }

    #[tokio::test]
    async fn test_missing_shell_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let server = StaticAssetServer::new(dir.path());
        assert!(server.resolve("/foo/bar").await.is_none());
        assert!(server.resolve("/").await.is_none());
    }
}
