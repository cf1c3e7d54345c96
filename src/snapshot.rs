//! One pipeline pass: fetch, extract, render, publish.

use crate::browser::BrowserEngine;
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::events::{now_timestamp, EventBus, RunTrigger, SnapshotEvent};
use crate::fetch;
use crate::publish;
use crate::render::{self, RenderStrategy};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

/// Report of one completed pipeline pass.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub finished_at: DateTime<Utc>,
    pub strategy: RenderStrategy,
    pub artifact_bytes: usize,
    pub zone_matched: bool,
    pub elapsed_ms: u64,
}

/// Execute one full pipeline pass against `engine`.
///
/// The steps run strictly in sequence; there is no mid-run retry. On any
/// failure the previously published artifact stays in place and the error
/// is reported to the caller and the event bus.
pub async fn run_once(
    config: &Config,
    engine: &dyn BrowserEngine,
    bus: &EventBus,
    trigger: RunTrigger,
) -> PipelineResult<RunReport> {
    let started = Instant::now();
    bus.emit(SnapshotEvent::RunStarted {
        trigger,
        timestamp: now_timestamp(),
    });
    info!("snapshot pass starting: {}", config.source_url);

    let mut session = engine
        .open()
        .await
        .map_err(|e| PipelineError::Fetch(format!("{e:#}")))?;

    let outcome = async {
        let content =
            fetch::fetch_page(session.as_mut(), config.source_url.as_str(), config.fetch_timeout)
                .await?;
        let rendered = render::render(session.as_ref(), config, &content).await?;
        publish::publish(&config.snapshot_path(), &rendered.bytes)?;
        Ok::<_, PipelineError>(rendered)
    }
    .await;

    if let Err(e) = session.close().await {
        warn!("browser session close failed: {e:#}");
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match outcome {
        Ok(rendered) => {
            let report = RunReport {
                finished_at: Utc::now(),
                strategy: rendered.strategy,
                artifact_bytes: rendered.bytes.len(),
                zone_matched: rendered.zone_matched,
                elapsed_ms,
            };
            bus.emit(SnapshotEvent::RunCompleted {
                strategy: report.strategy,
                artifact_bytes: report.artifact_bytes,
                zone_matched: report.zone_matched,
                elapsed_ms,
                timestamp: now_timestamp(),
            });
            info!(
                "snapshot pass complete: strategy={:?} bytes={} elapsed={}ms",
                report.strategy, report.artifact_bytes, elapsed_ms
            );
            Ok(report)
        }
        Err(e) => {
            bus.emit(SnapshotEvent::RunFailed {
                error: e.to_string(),
                elapsed_ms,
                timestamp: now_timestamp(),
            });
            Err(e)
        }
    }
}
