//! Event types for the multitrack event system
//!
//! Provides the observable event vocabulary of the sync engine and the
//! EventBus it is delivered through.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{EnvelopePoint, TrackId};

/// Multitrack engine events
///
/// Serialized names are stable and match the names hosts subscribe to
/// (`canplay`, `start-position-change`, ...). Events are emitted
/// synchronously, in the order the engine produces them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum MultitrackEvent {
    /// Engine ready: every initial resource finished loading (or failed)
    #[serde(rename = "canplay")]
    CanPlay {
        /// Timeline length at the moment the engine became ready
        max_duration: f64,
        /// When the engine became ready
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track's start offset was committed (drag or setter)
    #[serde(rename = "start-position-change")]
    StartPositionChange {
        id: TrackId,
        start_position: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track's start cue changed
    #[serde(rename = "start-cue-change")]
    StartCueChange {
        id: TrackId,
        start_cue: Option<f64>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track's end cue changed
    #[serde(rename = "end-cue-change")]
    EndCueChange {
        id: TrackId,
        end_cue: Option<f64>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The end of a track's fade-in moved
    #[serde(rename = "fade-in-change")]
    FadeInChange {
        id: TrackId,
        fade_in_end: Option<f64>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The start of a track's fade-out moved
    #[serde(rename = "fade-out-change")]
    FadeOutChange {
        id: TrackId,
        fade_out_start: Option<f64>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Envelope points of a track changed
    #[serde(rename = "envelope-points-change")]
    EnvelopePointsChange {
        id: TrackId,
        points: Vec<EnvelopePoint>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Baseline volume of a track changed
    #[serde(rename = "volume-change")]
    VolumeChange {
        id: TrackId,
        volume: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The intro marker of a track moved
    #[serde(rename = "intro-end-change")]
    IntroEndChange {
        id: TrackId,
        end_time: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A placeholder lane accepted a drop gesture
    ///
    /// Hosts interpret this as "attach a track to this id".
    #[serde(rename = "drop")]
    Drop {
        id: TrackId,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl MultitrackEvent {
    /// Stable event name, identical to the serialized `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            MultitrackEvent::CanPlay { .. } => "canplay",
            MultitrackEvent::StartPositionChange { .. } => "start-position-change",
            MultitrackEvent::StartCueChange { .. } => "start-cue-change",
            MultitrackEvent::EndCueChange { .. } => "end-cue-change",
            MultitrackEvent::FadeInChange { .. } => "fade-in-change",
            MultitrackEvent::FadeOutChange { .. } => "fade-out-change",
            MultitrackEvent::EnvelopePointsChange { .. } => "envelope-points-change",
            MultitrackEvent::VolumeChange { .. } => "volume-change",
            MultitrackEvent::IntroEndChange { .. } => "intro-end-change",
            MultitrackEvent::Drop { .. } => "drop",
        }
    }

    /// Track the event refers to (None for engine-wide events)
    pub fn track_id(&self) -> Option<&TrackId> {
        match self {
            MultitrackEvent::CanPlay { .. } => None,
            MultitrackEvent::StartPositionChange { id, .. }
            | MultitrackEvent::StartCueChange { id, .. }
            | MultitrackEvent::EndCueChange { id, .. }
            | MultitrackEvent::FadeInChange { id, .. }
            | MultitrackEvent::FadeOutChange { id, .. }
            | MultitrackEvent::EnvelopePointsChange { id, .. }
            | MultitrackEvent::VolumeChange { id, .. }
            | MultitrackEvent::IntroEndChange { id, .. }
            | MultitrackEvent::Drop { id, .. } => Some(id),
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Event distribution bus for engine events
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block the engine)
/// - Multiple concurrent subscribers
/// - Per-subscriber ordered delivery
/// - Lagged message detection for slow subscribers
///
/// Sending never awaits, so the single-threaded engine can publish from
/// inside its frame callback.
///
/// # Examples
///
/// ```
/// use mtrk_common::events::{EventBus, MultitrackEvent};
///
/// let bus = EventBus::new(64);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(MultitrackEvent::Drop {
///     id: "lane-3".into(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// let event = rx.try_recv().unwrap();
/// assert_eq!(event.name(), "drop");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MultitrackEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// * `capacity` - Number of events buffered per subscriber before the
    ///   oldest are dropped
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<MultitrackEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: MultitrackEvent,
    ) -> Result<usize, broadcast::error::SendError<MultitrackEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: MultitrackEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::trace!("No subscribers for {} event", e.0.name());
        }
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
