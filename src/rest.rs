//! HTTP surface for the published snapshot.
//!
//! Serving is independent of the pipeline: arbitrarily many readers hit
//! these routes while the scheduler's single writer replaces the artifact
//! atomically underneath them.

use crate::config::Config;
use crate::events::EventBus;
use crate::scheduler::Scheduler;
use crate::snapshot::RunReport;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Notify, RwLock};
use tower_http::cors::{Any, CorsLayer};

/// Shared state behind every route and the scheduler.
pub struct AppState {
    pub config: Config,
    pub started_at: Instant,
    pub bus: EventBus,
    pub scheduler: Scheduler,
    pub last_run: RwLock<Option<RunReport>>,
    pub runs_completed: AtomicU64,
    pub runs_failed: AtomicU64,
    pub ticks_skipped: AtomicU64,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            started_at: Instant::now(),
            bus: EventBus::new(256),
            scheduler: Scheduler::new(),
            last_run: RwLock::new(None),
            runs_completed: AtomicU64::new(0),
            runs_failed: AtomicU64::new(0),
            ticks_skipped: AtomicU64::new(0),
        })
    }
}

/// Build the axum Router with every route.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/latest.png", get(latest_png))
        .route("/api/v1/status", get(status))
        .route("/api/v1/events", get(events_sse))
        .layer(cors)
        .with_state(state)
}

/// Bind the configured port and serve until `shutdown` is notified.
pub async fn serve(state: Arc<AppState>, shutdown: Arc<Notify>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, state, shutdown).await
}

/// Serve on an already-bound listener (lets tests use an ephemeral port).
pub async fn serve_on(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("HTTP server listening on http://{addr}");
    let app = router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.notified().await })
        .await?;
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────

async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = format!(
        "shorecast is running.\nZone {} from {}.\nTry /latest.png for the snapshot, or /health.\n",
        state.config.zone, state.config.source_url
    );
    ([(header::CACHE_CONTROL, "no-store")], body)
}

async fn health() -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "no-store")], "ok")
}

/// The current artifact. 404 until the first pass publishes.
async fn latest_png(State(state): State<Arc<AppState>>) -> axum::response::Response {
    match tokio::fs::read(state.config.snapshot_path()).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            bytes,
        )
            .into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            [(header::CACHE_CONTROL, "no-store")],
            "snapshot not yet generated; try again shortly\n",
        )
            .into_response(),
    }
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let last_run = state.last_run.read().await.clone();
    let body = Json(serde_json::json!({
        "running": true,
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs_f64(),
        "zone": state.config.zone,
        "source_url": state.config.source_url.as_str(),
        "interval_seconds": state.config.interval.as_secs(),
        "scheduler_state": state.scheduler.state(),
        "snapshot_available": state.config.snapshot_path().exists(),
        "runs_completed": state.runs_completed.load(Ordering::Relaxed),
        "runs_failed": state.runs_failed.load(Ordering::Relaxed),
        "ticks_skipped": state.ticks_skipped.load(Ordering::Relaxed),
        "last_run": last_run,
    }));
    ([(header::CACHE_CONTROL, "no-store")], body)
}

/// Server-Sent Events stream of the event bus.
async fn events_sse(
    State(state): State<Arc<AppState>>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.bus.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Ok(json) = serde_json::to_string(&event) {
                        yield Ok(Event::default().data(json));
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    // Missed some events due to a slow consumer — continue
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
