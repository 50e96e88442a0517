// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Read-Only Status Endpoint
//!
//! Builds the axum router that exposes the node's peer and file statistics
//! to a browser. Every route is read-only — nothing here mutates the
//! Metadata Store or the Peer Table, matching the boundary contract the
//! rest of the crate draws around this HTTP surface.
//!
//! ## Endpoints
//!
//! | Method | Path          | Description                               |
//! |--------|---------------|--------------------------------------------|
//! | GET    | `/`           | Static landing page                        |
//! | GET    | `/stats.json` | Peer table + metadata store snapshot        |
//! | GET    | `/style.css`  | Static asset referenced by the landing page |
//! | *      | (anything else) | 404                                       |

use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use driftpeer_core::network::Node;

/// Application state shared by every handler: just the node itself.
#[derive(Clone)]
pub struct AppState {
    pub node: Arc<Node>,
}

/// Snapshot of one peer, as rendered to `/stats.json`.
#[derive(Debug, Serialize)]
struct PeerView {
    peer_id: String,
    host: String,
    port: u16,
    last_seen: u64,
}

/// Snapshot of one file record, as rendered to `/stats.json`.
#[derive(Debug, Serialize)]
struct FileView {
    content_id: String,
    file_name: String,
    file_size: u64,
    file_owner: String,
    file_timestamp: u64,
    replicas: Vec<String>,
    local: bool,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    #[serde(rename = "peerId")]
    peer_id: String,
    peers: Vec<PeerView>,
    files: Vec<FileView>,
}

/// Builds the full axum [`Router`] for the status endpoint.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing_page_handler))
        .route("/stats.json", get(stats_handler))
        .route("/style.css", get(style_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /` — the static landing page.
async fn landing_page_handler() -> impl IntoResponse {
    Html(LANDING_PAGE)
}

/// `GET /style.css` — the one static asset the landing page references.
async fn style_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], STYLE_CSS)
}

/// `GET /stats.json` — a point-in-time snapshot of the peer table and the
/// metadata store. Never mutates either.
async fn stats_handler(axum::extract::State(state): axum::extract::State<AppState>) -> impl IntoResponse {
    let node = &state.node;

    let peers = node
        .peers
        .all()
        .into_iter()
        .map(|p| PeerView {
            peer_id: p.peer_id.to_string(),
            host: p.endpoint.host.clone(),
            port: p.endpoint.port,
            last_seen: p.last_seen,
        })
        .collect();

    let files = node
        .store
        .list_all()
        .into_iter()
        .map(|r| FileView {
            local: r.is_local(&node.blob_dir),
            content_id: r.content_id,
            file_name: r.file_name,
            file_size: r.file_size,
            file_owner: r.file_owner.to_string(),
            file_timestamp: r.file_timestamp,
            replicas: r.replicas.iter().map(|p| p.to_string()).collect(),
        })
        .collect();

    Json(StatsResponse {
        peer_id: node.peer_id.to_string(),
        peers,
        files,
    })
}

/// Anything not matching a recognized path is a 404, never a mutation.
async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>driftpeer</title>
<link rel="stylesheet" href="/style.css">
</head>
<body>
<h1>driftpeer</h1>
<p>This node's peer and file statistics are available at <a href="/stats.json">/stats.json</a>.</p>
</body>
</html>
"#;

const STYLE_CSS: &str = r#"body { font-family: monospace; margin: 2rem; }
h1 { font-size: 1.25rem; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use driftpeer_core::identity::{Endpoint, PeerId};
    use driftpeer_core::network::Node;
    use driftpeer_core::storage::MetadataStore;
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempdir().unwrap();
        let store = MetadataStore::load(dir.path().join("metadata.json")).unwrap();
        let node = Arc::new(Node::new(
            PeerId::new("self"),
            Endpoint::new("127.0.0.1", 9000),
            dir.path().to_path_buf(),
            dir.path().join("FileUploads"),
            store,
        ));
        (dir, AppState { node })
    }

    #[tokio::test]
    async fn landing_page_serves_html() {
        let (_dir, state) = state();
        let app = create_router(state);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn stats_json_reflects_empty_node() {
        let (_dir, state) = state();
        let app = create_router(state);
        let response = app
            .oneshot(Request::builder().uri("/stats.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["peerId"], "self");
        assert!(parsed["peers"].as_array().unwrap().is_empty());
        assert!(parsed["files"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let (_dir, state) = state();
        let app = create_router(state);
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
