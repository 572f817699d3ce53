//! Cue and fade policy
//!
//! Decides muting from a track's cue window and derives the envelope
//! points that implement configured fades.

use mtrk_common::EnvelopePoint;

/// Envelope point id placed at the start cue when a fade-in is configured
pub const FADE_IN_START_ID: &str = "fadeInStart";
/// Envelope point id marking the end of the fade-in
pub const FADE_IN_END_ID: &str = "fadeInEnd";
/// Envelope point id marking the start of the fade-out
pub const FADE_OUT_START_ID: &str = "fadeOutStart";
/// Envelope point id placed at the end cue when a fade-out is configured
pub const FADE_OUT_END_ID: &str = "fadeOutEnd";

const RESERVED_IDS: [&str; 4] = [
    FADE_IN_START_ID,
    FADE_IN_END_ID,
    FADE_OUT_START_ID,
    FADE_OUT_END_ID,
];

/// Cue window and fade settings of one track, all in local seconds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CueWindow {
    pub start_cue: Option<f64>,
    pub end_cue: Option<f64>,
    pub fade_in_end: Option<f64>,
    pub fade_out_start: Option<f64>,
}

impl CueWindow {
    /// Muted iff `local < start_cue (or 0)` or `local > end_cue (or +inf)`
    ///
    /// Both bounds are inclusive for audibility. An inverted window mutes
    /// everything rather than failing.
    pub fn is_muted(&self, local_time: f64) -> bool {
        is_muted(local_time, self.start_cue, self.end_cue)
    }

    pub fn has_fades(&self) -> bool {
        self.fade_in_end.is_some() || self.fade_out_start.is_some()
    }
}

/// See [`CueWindow::is_muted`]
pub fn is_muted(local_time: f64, start_cue: Option<f64>, end_cue: Option<f64>) -> bool {
    local_time < start_cue.unwrap_or(0.0) || local_time > end_cue.unwrap_or(f64::INFINITY)
}

/// True for the ids this module owns
pub fn is_fade_point(point: &EnvelopePoint) -> bool {
    point
        .id
        .as_deref()
        .is_some_and(|id| RESERVED_IDS.contains(&id))
}

/// Rebuild the fade points of an envelope
///
/// Existing fade points are discarded and re-derived from `window`; user
/// points are kept. The result is ordered by time (stable for ties).
///
/// - fade-in: volume 0 at `start_cue` (if set), `volume` at `fade_in_end`
/// - fade-out: `volume` at `fade_out_start`, volume 0 at `end_cue` (if set)
pub fn derive_fade_points(
    existing: &[EnvelopePoint],
    window: &CueWindow,
    volume: f64,
) -> Vec<EnvelopePoint> {
    let mut points: Vec<EnvelopePoint> = existing
        .iter()
        .filter(|p| !is_fade_point(p))
        .cloned()
        .collect();

    if let Some(fade_in_end) = window.fade_in_end {
        if let Some(start_cue) = window.start_cue {
            points.push(EnvelopePoint::with_id(start_cue, 0.0, FADE_IN_START_ID));
        }
        points.push(EnvelopePoint::with_id(fade_in_end, volume, FADE_IN_END_ID));
    }

    if let Some(fade_out_start) = window.fade_out_start {
        points.push(EnvelopePoint::with_id(fade_out_start, volume, FADE_OUT_START_ID));
        if let Some(end_cue) = window.end_cue {
            points.push(EnvelopePoint::with_id(end_cue, 0.0, FADE_OUT_END_ID));
        }
    }

    points.sort_by(|a, b| a.time.total_cmp(&b.time));
    points
}

/// Fade values encoded in a set of envelope points
///
/// Returns `(fade_in_end, fade_out_start)` read from the points with the
/// reserved ids, if present.
pub fn read_fade_points(points: &[EnvelopePoint]) -> (Option<f64>, Option<f64>) {
    let find = |id: &str| points.iter().find(|p| p.is(id)).map(|p| p.time);
    (find(FADE_IN_END_ID), find(FADE_OUT_START_ID))
}
