//! Track identity and envelope point types
//!
//! These are shared between the engine (which owns tracks) and any host
//! that serializes events or session files.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, stable track identifier
///
/// Ids are compared by value only; the engine never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Create an id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id (UUIDv4)
    ///
    /// Used for session tracks that do not name themselves.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TrackId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One point of a volume envelope
///
/// `time` is local to the track (seconds from the track's own start),
/// `volume` is a gain multiplier in 0..1. Points carrying an `id` can be
/// located again after a round-trip through the envelope collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePoint {
    pub time: f64,
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl EnvelopePoint {
    pub fn new(time: f64, volume: f64) -> Self {
        Self {
            time,
            volume,
            id: None,
        }
    }

    pub fn with_id(time: f64, volume: f64, id: impl Into<String>) -> Self {
        Self {
            time,
            volume,
            id: Some(id.into()),
        }
    }

    /// True if this point carries the given id
    pub fn is(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }
}
