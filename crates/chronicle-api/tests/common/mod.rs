//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chronicle_api::config::Config;
use chronicle_test_support::{FixedClock, SequentialIds};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

/// Configuration pointing the store and the outbox into `dir`.
pub fn test_config(dir: &TempDir) -> Config {
    Config {
        data_dir: dir.path().join("events"),
        outbox_dir: dir.path().join("outbox"),
        host: "127.0.0.1".to_owned(),
        port: 0,
        base_url: "http://blog.test".to_owned(),
        cors_origins: Vec::new(),
    }
}

/// Build the full app router over a real `FileEventStore` in `dir`, with a
/// fixed clock and sequential ids prefixed by `id_prefix`. Uses the same
/// wiring as `main.rs`.
pub async fn build_test_app_with_ids(dir: &TempDir, id_prefix: &'static str) -> Router {
    build_test_app_with_config(&test_config(dir), id_prefix).await
}

/// Build the full app router from an explicit `config`.
pub async fn build_test_app_with_config(config: &Config, id_prefix: &'static str) -> Router {
    let state = chronicle_api::build_state(
        config,
        Arc::new(FixedClock::default_instant()),
        Arc::new(SequentialIds::new(id_prefix)),
    )
    .await
    .unwrap();
    chronicle_api::router(state, config.cors_layer().unwrap())
}

/// Build the full app router with ids `id-1`, `id-2`, ...
pub async fn build_test_app(dir: &TempDir) -> Router {
    build_test_app_with_ids(dir, "id").await
}

/// Record files of one stream in the store, sorted.
pub fn stream_files(dir: &TempDir, stream: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir.path().join("events").join(stream)) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries.map(|entry| entry.unwrap().path()).collect();
    files.sort();
    files
}

/// Mails written to the outbox, parsed, oldest first.
pub fn outbox(dir: &TempDir) -> Vec<serde_json::Value> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir.path().join("outbox"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
        .iter()
        .map(|path| serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap())
        .collect()
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
