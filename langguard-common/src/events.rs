//! Pipeline event types and the broadcast bus that carries them
//!
//! Events are published by the translation pipeline as each stage finishes and
//! forwarded to browsers over SSE. Delivery is best-effort: a pipeline never
//! waits on, or fails because of, a missing subscriber.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Pipeline stage identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Acquisition,
    Demux,
    Extraction,
    Transcription,
    LanguageDetection,
    Translation,
    Synthesis,
    Storage,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Acquisition => "acquisition",
            PipelineStage::Demux => "demux",
            PipelineStage::Extraction => "extraction",
            PipelineStage::Transcription => "transcription",
            PipelineStage::LanguageDetection => "language_detection",
            PipelineStage::Translation => "translation",
            PipelineStage::Synthesis => "synthesis",
            PipelineStage::Storage => "storage",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events emitted over the course of one pipeline invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    SessionStarted {
        session_id: String,
        media_kind: String,
        timestamp: DateTime<Utc>,
    },
    StageCompleted {
        session_id: String,
        stage: PipelineStage,
        elapsed_ms: u64,
        timestamp: DateTime<Utc>,
    },
    SessionCompleted {
        session_id: String,
        has_translation: bool,
        timestamp: DateTime<Utc>,
    },
    SessionFailed {
        session_id: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl PipelineEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            PipelineEvent::SessionStarted { .. } => "SessionStarted",
            PipelineEvent::StageCompleted { .. } => "StageCompleted",
            PipelineEvent::SessionCompleted { .. } => "SessionCompleted",
            PipelineEvent::SessionFailed { .. } => "SessionFailed",
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            PipelineEvent::SessionStarted { session_id, .. }
            | PipelineEvent::StageCompleted { session_id, .. }
            | PipelineEvent::SessionCompleted { session_id, .. }
            | PipelineEvent::SessionFailed { session_id, .. } => session_id,
        }
    }
}

/// Broadcast bus for [`PipelineEvent`]s
///
/// Cloning the bus is cheap; every clone publishes into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PipelineEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lag and lose the oldest events once `capacity`
    /// events are buffered.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.tx.subscribe()
    }

    /// Emit an event
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PipelineEvent,
    ) -> Result<usize, broadcast::error::SendError<PipelineEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PipelineEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_emitted_event() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        let event = PipelineEvent::StageCompleted {
            session_id: "abc".to_string(),
            stage: PipelineStage::Translation,
            elapsed_ms: 12,
            timestamp: Utc::now(),
        };
        assert_eq!(bus.emit(event.clone()).unwrap(), 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received, event);
        assert_eq!(received.event_type(), "StageCompleted");
        assert_eq!(received.session_id(), "abc");
    }

    #[test]
    fn emit_without_subscribers_is_an_error_but_lossy_is_not() {
        let bus = EventBus::new(4);
        let event = PipelineEvent::SessionFailed {
            session_id: "s".to_string(),
            message: "boom".to_string(),
            timestamp: Utc::now(),
        };
        assert!(bus.emit(event.clone()).is_err());
        bus.emit_lossy(event);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.capacity(), 4);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PipelineEvent::StageCompleted {
            session_id: "s1".to_string(),
            stage: PipelineStage::LanguageDetection,
            elapsed_ms: 3,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StageCompleted");
        assert_eq!(json["stage"], "language_detection");
    }
}
