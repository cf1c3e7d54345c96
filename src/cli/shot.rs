//! Take exactly one snapshot and exit.

use crate::browser::chromium::ChromiumEngine;
use crate::config::{Config, Overrides};
use crate::events::{EventBus, RunTrigger};
use crate::snapshot;
use anyhow::{Context, Result};

pub async fn run(overrides: Overrides) -> Result<()> {
    let config = Config::resolve(overrides)?;

    std::fs::create_dir_all(&config.public_dir).with_context(|| {
        format!(
            "failed to create public dir {}",
            config.public_dir.display()
        )
    })?;

    let engine = ChromiumEngine::discover(config.chromium_path.as_deref())?;
    let bus = EventBus::new(16);

    let report = snapshot::run_once(&config, &engine, &bus, RunTrigger::Manual).await?;
    println!(
        "snapshot written to {} ({} bytes, strategy {:?})",
        config.snapshot_path().display(),
        report.artifact_bytes,
        report.strategy
    );
    Ok(())
}
