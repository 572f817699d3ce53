//! Drag controller arithmetic
//!
//! Turns a normalized drag delta into a candidate start offset and checks
//! it against the timeline bounds. Out-of-bounds candidates are rejected
//! whole; there is no clamping.

/// Seconds a track may hang before the timeline origin beyond its own
/// length when drag bounds are off
pub const DEFAULT_DRAG_SLACK: f64 = 1.0;

/// Accepted range of start offsets for one track (inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragBounds {
    pub min_start: f64,
    pub max_start: f64,
}

impl DragBounds {
    /// Bounds for a track of `duration` on a timeline of `max_duration`
    ///
    /// - bounded: `[0, max - duration]`
    /// - unbounded: `[-(duration) - slack, max - duration]`
    pub fn for_track(duration: f64, max_duration: f64, bounded: bool, slack: f64) -> Self {
        let min_start = if bounded { 0.0 } else { -duration - slack };
        Self {
            min_start,
            max_start: max_duration - duration,
        }
    }

    pub fn contains(&self, start: f64) -> bool {
        start >= self.min_start && start <= self.max_start
    }
}

/// Start offset proposed by a drag of `normalized_delta` timeline widths
#[inline]
pub fn propose_start(current_start: f64, normalized_delta: f64, max_duration: f64) -> f64 {
    current_start + normalized_delta * max_duration
}

/// Outcome of validating a candidate start offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragDecision {
    /// Commit exactly this start offset
    Commit(f64),
    /// Leave the track where it is
    Reject,
}

/// All-or-nothing validation of a candidate start offset
pub fn validate(proposed: f64, bounds: &DragBounds) -> DragDecision {
    if proposed.is_finite() && bounds.contains(proposed) {
        DragDecision::Commit(proposed)
    } else {
        DragDecision::Reject
    }
}
