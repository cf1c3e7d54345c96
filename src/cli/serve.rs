//! Run the snapshot service: scheduler plus HTTP server.

use crate::browser::chromium::ChromiumEngine;
use crate::browser::BrowserEngine;
use crate::config::{Config, Overrides};
use crate::events::SnapshotEvent;
use crate::rest::{self, AppState};
use crate::scheduler;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;

pub async fn run(overrides: Overrides) -> Result<()> {
    let config = Config::resolve(overrides)?;

    std::fs::create_dir_all(&config.public_dir).with_context(|| {
        format!(
            "failed to create public dir {}",
            config.public_dir.display()
        )
    })?;

    info!("starting shorecast v{}", env!("CARGO_PKG_VERSION"));
    info!("source: {}", config.source_url);
    info!("zone: {} ({})", config.zone, config.header);
    info!("publishing to {}", config.snapshot_path().display());

    let engine: Arc<dyn BrowserEngine> =
        Arc::new(ChromiumEngine::discover(config.chromium_path.as_deref())?);

    let port = config.port;
    let state = AppState::new(config);
    state.bus.emit(SnapshotEvent::ServerStarted { port });

    let shutdown = Arc::new(Notify::new());

    // ctrl-c stops both the tick loop and the listener
    let shutdown_signal = Arc::clone(&shutdown);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("received shutdown signal");
        shutdown_signal.notify_waiters();
    });

    let scheduler_task = scheduler::spawn(Arc::clone(&state), engine, Arc::clone(&shutdown));

    let result = rest::serve(state, shutdown).await;

    let _ = scheduler_task.await;
    info!("shorecast stopped");
    result
}
