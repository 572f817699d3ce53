//! Track registry operations for MultitrackEngine
//!
//! **Responsibilities:**
//! - Building a live track from a spec (resource, envelope, fade points)
//! - Replacing tracks in place
//! - Load-complete / load-failed notifications
//! - Baseline volume and start offset (drag and direct setter)

use mtrk_common::events::MultitrackEvent;
use mtrk_common::TrackId;
use tracing::{debug, info, warn};

use super::MultitrackEngine;
use crate::envelope::EnvelopeFactory;
use crate::resource::ResourceFactory;
use crate::timeline::cue::derive_fade_points;
use crate::timeline::drag::{self, DragBounds, DragDecision};
use crate::track::{LoadState, Track, TrackSpec};

/// Create the resource and envelope for `spec` and bind them
///
/// The resource inherits the engine's rate and output device. Fade
/// points are derived from the spec's cues and handed to the envelope.
pub(super) fn build_track(
    resources: &mut dyn ResourceFactory,
    envelopes: &mut dyn EnvelopeFactory,
    spec: TrackSpec,
    audio_rate: f64,
    sink_id: Option<&str>,
) -> Track {
    let mut resource = resources.create(&spec);
    resource.set_playback_rate(audio_rate);
    if let Some(sink) = sink_id {
        resource.set_sink_id(sink);
    }
    let envelope = envelopes.create(&spec);

    let mut track = Track::bind(spec, resource, envelope);
    track.resource.set_volume(track.volume);
    track.envelope_points = derive_fade_points(&track.envelope_points, &track.cues, track.volume);

    let points = track.envelope_points.clone();
    let volume = track.volume;
    if let Some(envelope) = track.envelope.as_mut() {
        envelope.set_points(points);
        envelope.set_volume(volume);
    }

    debug!(
        "Built track {} (start {:.3}s, {:?})",
        track.id, track.start_position, track.load_state
    );
    track
}

impl MultitrackEngine {
    /// Replace the track with the same id, in place
    ///
    /// The old resource is stopped and detached before the new record
    /// takes its index. Unknown ids are ignored.
    pub fn add_or_replace_track(&mut self, spec: TrackSpec) {
        if self.destroyed {
            return;
        }
        let Some(index) = self.registry.index_of(&spec.id) else {
            debug!("add_or_replace_track: no track {}, ignoring", spec.id);
            return;
        };
        if let Err(e) = spec.validate() {
            warn!("Ignoring replacement for track {}: {}", spec.id, e);
            return;
        }

        let id = spec.id.clone();
        let track = build_track(
            self.resources.as_mut(),
            self.envelopes.as_mut(),
            spec,
            self.audio_rate,
            self.sink_id.as_deref(),
        );
        let ready = track.load_state() != LoadState::Pending;

        if let Some(mut old) = self.registry.replace(index, track) {
            old.release();
        }
        info!("Replaced track {} at index {}", id, index);

        self.recompute_timeline();
        self.apply_position(self.position, false);

        if ready {
            self.settle_load(&id);
        }
    }

    /// Load-complete notification: install the final duration
    pub fn handle_resource_loaded(&mut self, id: &TrackId, duration: f64) {
        if self.destroyed {
            return;
        }
        if !(duration.is_finite() && duration >= 0.0) {
            warn!("Track {} reported invalid duration {}", id, duration);
            self.handle_resource_failed(id);
            return;
        }
        let Some(index) = self.registry.index_of(id) else {
            debug!("Load notification for unknown track {}", id);
            return;
        };
        let Some(track) = self.registry.get_mut(index) else {
            return;
        };
        if track.load_state == LoadState::Failed {
            debug!("Ignoring late load of failed track {}", id);
            return;
        }

        track.duration = duration;
        track.load_state = LoadState::Ready;
        track.resource.set_duration(duration);
        info!("Track {} loaded: {:.3}s", id, duration);

        self.recompute_timeline();
        self.apply_position(self.position, false);
        self.settle_load(id);
    }

    /// Load-failed notification: the track is never in range again
    pub fn handle_resource_failed(&mut self, id: &TrackId) {
        if self.destroyed {
            return;
        }
        let Some(index) = self.registry.index_of(id) else {
            debug!("Failure notification for unknown track {}", id);
            return;
        };
        let Some(track) = self.registry.get_mut(index) else {
            return;
        };

        warn!("Track {} failed to load, skipping it", id);
        track.load_state = LoadState::Failed;
        track.duration = 0.0;
        track.resource.pause();

        self.recompute_timeline();
        self.apply_position(self.position, false);
        self.settle_load(id);
    }

    /// Set a track's baseline volume (clamped to `[0, 1]`)
    pub fn set_track_volume(&mut self, index: usize, volume: f64) {
        if self.destroyed {
            return;
        }
        if !volume.is_finite() {
            warn!("Ignoring non-finite volume {} for track {}", volume, index);
            return;
        }
        let apply_gain = self.options.apply_envelope_gain;
        let Some(track) = self.registry.get_mut(index) else {
            debug!("set_track_volume: no track at index {}", index);
            return;
        };

        let volume = volume.clamp(0.0, 1.0);
        track.volume = volume;
        if let Some(envelope) = track.envelope.as_mut() {
            envelope.set_volume(volume);
        }
        if !apply_gain {
            track.resource.set_volume(volume);
        }
        let id = track.id.clone();

        self.emit(MultitrackEvent::VolumeChange {
            id,
            volume,
            timestamp: chrono::Utc::now(),
        });
        self.rederive_fades(index);
        self.apply_position(self.position, false);
    }

    /// Move a track to an absolute start offset
    ///
    /// Same bounds and all-or-nothing commit as a drag, without the
    /// draggable check.
    pub fn set_track_start_position(&mut self, index: usize, start_position: f64) -> DragDecision {
        if self.destroyed {
            return DragDecision::Reject;
        }
        self.commit_start(index, start_position)
    }

    /// Drag gesture: `normalized_delta` is a fraction of the timeline width
    pub fn on_drag(&mut self, index: usize, normalized_delta: f64) -> DragDecision {
        if self.destroyed {
            return DragDecision::Reject;
        }
        let Some(track) = self.registry.get(index) else {
            debug!("on_drag: no track at index {}", index);
            return DragDecision::Reject;
        };
        if !track.is_draggable() {
            return DragDecision::Reject;
        }

        let proposed = drag::propose_start(track.start_position(), normalized_delta, self.max_duration);
        self.commit_start(index, proposed)
    }

    /// Validate and, if inside the bounds, commit a start offset
    ///
    /// A commit recomputes the timeline, re-applies the unchanged global
    /// position and emits `start-position-change`, all before returning.
    fn commit_start(&mut self, index: usize, proposed: f64) -> DragDecision {
        let Some(track) = self.registry.get(index) else {
            debug!("No track at index {}", index);
            return DragDecision::Reject;
        };

        let bounds = DragBounds::for_track(
            track.duration(),
            self.max_duration,
            self.options.drag_bounds,
            self.options.drag_slack,
        );
        let decision = drag::validate(proposed, &bounds);

        let DragDecision::Commit(start_position) = decision else {
            debug!(
                "Rejected start {:.3}s for {} (bounds [{:.3}, {:.3}])",
                proposed,
                track.id(),
                bounds.min_start,
                bounds.max_start
            );
            return decision;
        };

        let Some(track) = self.registry.get_mut(index) else {
            return DragDecision::Reject;
        };
        track.start_position = start_position;
        let id = track.id.clone();

        self.recompute_timeline();
        self.apply_position(self.position, false);

        self.emit(MultitrackEvent::StartPositionChange {
            id,
            start_position,
            timestamp: chrono::Utc::now(),
        });
        decision
    }
}
