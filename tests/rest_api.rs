//! HTTP surface tests against a live listener on an ephemeral port.

use regex::RegexBuilder;
use shorecast::config::Config;
use shorecast::publish;
use shorecast::rest::{self, AppState};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use url::Url;

fn test_config(dir: &Path) -> Config {
    Config {
        source_url: Url::parse("http://bulletin.test/product").unwrap(),
        zone: "CAZ340".to_string(),
        zone_pattern: RegexBuilder::new("CAZ340")
            .case_insensitive(true)
            .build()
            .unwrap(),
        header: "San Luis Obispo County Beaches".to_string(),
        port: 0,
        public_dir: dir.to_path_buf(),
        interval: Duration::from_secs(900),
        fetch_timeout: Duration::from_secs(60),
        timezone: chrono_tz::America::Los_Angeles,
        chromium_path: None,
    }
}

async fn spawn_app(state: Arc<AppState>) -> (SocketAddr, Arc<Notify>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Arc::new(Notify::new());
    let sd = Arc::clone(&shutdown);
    tokio::spawn(async move {
        rest::serve_on(listener, state, sd).await.unwrap();
    });
    (addr, shutdown)
}

#[tokio::test]
async fn test_health_and_index() {
    let dir = TempDir::new().unwrap();
    let state = AppState::new(test_config(dir.path()));
    let (addr, shutdown) = spawn_app(state).await;

    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["cache-control"], "no-store");
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = client.get(format!("http://{addr}/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("latest.png"));
    assert!(body.contains("CAZ340"));

    shutdown.notify_waiters();
}

#[tokio::test]
async fn test_latest_png_contract() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let snapshot_path = config.snapshot_path();
    let state = AppState::new(config);
    let (addr, shutdown) = spawn_app(state).await;

    let client = reqwest::Client::new();
    let url = format!("http://{addr}/latest.png");

    // Before the first publish: 404, never an empty 200.
    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.headers()["cache-control"], "no-store");

    publish::publish(&snapshot_path, b"png-bytes-here").unwrap();

    let resp = client
        .get(&url)
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "image/png");
    assert_eq!(resp.headers()["cache-control"], "no-store");
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"png-bytes-here");

    shutdown.notify_waiters();
}

#[tokio::test]
async fn test_status_endpoint_shape() {
    let dir = TempDir::new().unwrap();
    let state = AppState::new(test_config(dir.path()));
    let (addr, shutdown) = spawn_app(state).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/api/v1/status"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(body["running"], true);
    assert_eq!(body["zone"], "CAZ340");
    assert_eq!(body["scheduler_state"], "idle");
    assert_eq!(body["snapshot_available"], false);
    assert_eq!(body["runs_completed"], 0);
    assert!(body["last_run"].is_null());

    shutdown.notify_waiters();
}
