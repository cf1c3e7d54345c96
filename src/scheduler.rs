//! Scheduled pipeline execution with an at-most-one-run guarantee.

use crate::browser::BrowserEngine;
use crate::events::{RunTrigger, SnapshotEvent};
use crate::rest::AppState;
use crate::snapshot;
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

const IDLE: u8 = 0;
const RUNNING: u8 = 1;

/// Scheduler states. A tick only starts a pass from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
}

/// Guards the Idle -> Running transition so pipeline passes never overlap,
/// independent of which tasks the ticks land on.
pub struct Scheduler {
    state: AtomicU8,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
        }
    }

    /// Attempt the Idle -> Running transition. `false` means a pass is
    /// already in flight and the caller's tick must be dropped.
    pub fn try_begin(&self) -> bool {
        self.state
            .compare_exchange(IDLE, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Return to Idle. Called after every pass, success or failure.
    pub fn finish(&self) {
        self.state.store(IDLE, Ordering::SeqCst);
    }

    pub fn state(&self) -> RunState {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => RunState::Running,
            _ => RunState::Idle,
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the tick loop: one pass at startup, then one per interval.
///
/// Passes run on their own task so the loop keeps ticking; the state
/// machine drops any tick that lands while a pass is still in flight. A
/// failed pass is logged and the state returns to Idle; the next tick is
/// the retry mechanism.
pub fn spawn(
    state: Arc<AppState>,
    engine: Arc<dyn BrowserEngine>,
    shutdown: Arc<Notify>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "scheduler started: interval={}s",
            state.config.interval.as_secs()
        );
        let mut ticker = tokio::time::interval(state.config.interval);
        // A tick that lands mid-pass is dropped, not queued.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut first = true;

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    info!("scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let trigger = if first { RunTrigger::Startup } else { RunTrigger::Interval };
                    first = false;

                    if !state.scheduler.try_begin() {
                        warn!("previous snapshot pass still running; dropping tick");
                        state.ticks_skipped.fetch_add(1, Ordering::Relaxed);
                        state.bus.emit(SnapshotEvent::TickSkipped);
                        continue;
                    }

                    let st = Arc::clone(&state);
                    let eng = Arc::clone(&engine);
                    tokio::spawn(async move {
                        match snapshot::run_once(&st.config, eng.as_ref(), &st.bus, trigger).await {
                            Ok(report) => {
                                st.runs_completed.fetch_add(1, Ordering::Relaxed);
                                *st.last_run.write().await = Some(report);
                            }
                            Err(e) => {
                                st.runs_failed.fetch_add(1, Ordering::Relaxed);
                                error!("snapshot pass failed: {e}");
                            }
                        }
                        st.scheduler.finish();
                    });
                }
            }
        }
    })
}
