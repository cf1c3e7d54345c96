//! Event bus — typed events from the scheduler and pipeline.
//!
//! A `tokio::sync::broadcast` channel carrying [`SnapshotEvent`] values.
//! The SSE endpoint and any other consumer subscribe independently; with no
//! subscribers events are silently dropped.

use crate::render::RenderStrategy;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// What caused a pipeline pass to start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunTrigger {
    /// The first tick after process start.
    Startup,
    /// A regular interval tick.
    Interval,
    /// An operator-initiated one-off pass.
    Manual,
}

/// Every event shorecast emits. Serialized to JSON for the SSE stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SnapshotEvent {
    /// The HTTP server came up.
    ServerStarted { port: u16 },
    /// A pipeline pass began.
    RunStarted { trigger: RunTrigger, timestamp: String },
    /// A pass published a fresh artifact.
    RunCompleted {
        strategy: RenderStrategy,
        artifact_bytes: usize,
        zone_matched: bool,
        elapsed_ms: u64,
        timestamp: String,
    },
    /// A pass aborted; the prior artifact stays published.
    RunFailed {
        error: String,
        elapsed_ms: u64,
        timestamp: String,
    },
    /// A tick landed while a pass was still running and was dropped.
    TickSkipped,
}

/// The central event bus.
pub struct EventBus {
    sender: broadcast::Sender<SnapshotEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers. Silently ignores if no subscribers.
    pub fn emit(&self, event: SnapshotEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<SnapshotEvent> {
        self.sender.subscribe()
    }
}

/// RFC 3339 timestamp for event payloads.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_roundtrip() {
        let event = SnapshotEvent::RunCompleted {
            strategy: RenderStrategy::Templated,
            artifact_bytes: 42_000,
            zone_matched: true,
            elapsed_ms: 1800,
            timestamp: now_timestamp(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("RunCompleted"));
        assert!(json.contains("templated"));

        let parsed: SnapshotEvent = serde_json::from_str(&json).unwrap();
        match parsed {
            SnapshotEvent::RunCompleted { artifact_bytes, .. } => {
                assert_eq!(artifact_bytes, 42_000)
            }
            _ => panic!("wrong variant"),
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_subscriber() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.emit(SnapshotEvent::TickSkipped);
        match rx.recv().await.unwrap() {
            SnapshotEvent::TickSkipped => {}
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_harmless() {
        let bus = EventBus::new(8);
        bus.emit(SnapshotEvent::ServerStarted { port: 8080 });
    }
}
