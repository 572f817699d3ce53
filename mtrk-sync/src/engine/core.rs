//! Engine state, lifecycle and the synchronization pass
//!
//! **Responsibilities:**
//! - Engine construction from track specs and collaborators
//! - `apply_position`: correct every resource for one global position
//! - Timeline recomputation (max duration, control lane, layout)
//! - Sync clock frames: sample resources, re-anchor to the furthest one
//! - Teardown

use std::collections::HashSet;

use mtrk_common::events::{EventBus, MultitrackEvent};
use mtrk_common::TrackId;
use tracing::{debug, info, trace};

use crate::bridge::{NullBridge, RenderingBridge, TrackOffset};
use crate::clock::{self, FrameHandle, SyncClock};
use crate::config::EngineOptions;
use crate::envelope::{DefaultEnvelopeFactory, EnvelopeFactory};
use crate::error::{Error, Result};
use crate::resource::{DefaultResourceFactory, PlaybackResource, ResourceFactory, SilentResource};
use crate::timeline::{position, Layout};
use crate::track::{LoadState, Track, TrackRegistry, TrackSpec};

use super::tracks::build_track;

/// External collaborators the engine drives
pub struct Collaborators {
    pub bridge: Box<dyn RenderingBridge>,
    pub resources: Box<dyn ResourceFactory>,
    pub envelopes: Box<dyn EnvelopeFactory>,
}

impl Collaborators {
    /// No visual layer; default resource and envelope variants
    pub fn headless(options: &EngineOptions) -> Self {
        Self {
            bridge: Box::new(NullBridge::default()),
            resources: Box::new(DefaultResourceFactory),
            envelopes: Box::new(DefaultEnvelopeFactory {
                curve: options.envelope_curve,
            }),
        }
    }
}

/// Keeps independently-clocked playback resources on one timeline
///
/// Single-threaded: every method runs to completion on the caller's
/// thread, and all corrections it implies (resource clocks, play/pause,
/// muting, bridge updates) have happened by the time it returns.
pub struct MultitrackEngine {
    pub(super) options: EngineOptions,
    pub(super) registry: TrackRegistry,
    pub(super) bridge: Box<dyn RenderingBridge>,
    pub(super) resources: Box<dyn ResourceFactory>,
    pub(super) envelopes: Box<dyn EnvelopeFactory>,
    pub(super) events: EventBus,
    pub(super) clock: SyncClock,

    /// Global position in seconds (the one authoritative playhead)
    pub(super) position: f64,
    pub(super) max_duration: f64,
    pub(super) layout: Layout,
    /// Current zoom floor
    pub(super) min_px_per_sec: f64,
    pub(super) audio_rate: f64,
    pub(super) sink_id: Option<String>,
    pub(super) playing: bool,
    pub(super) destroyed: bool,

    /// Initial tracks whose load has not settled yet
    pub(super) pending_loads: HashSet<TrackId>,
    pub(super) can_play_sent: bool,
}

impl MultitrackEngine {
    /// Register the initial tracks and lay out the timeline
    ///
    /// Subscribe to `events` before calling: `canplay` is emitted from
    /// here when no track needs to load.
    pub fn new(
        specs: Vec<TrackSpec>,
        options: EngineOptions,
        collaborators: Collaborators,
        events: EventBus,
    ) -> Result<Self> {
        options.validate()?;

        let mut seen = HashSet::new();
        for spec in &specs {
            spec.validate()?;
            if !seen.insert(spec.id.clone()) {
                return Err(Error::InvalidArgument(format!("duplicate track id {}", spec.id)));
            }
        }

        let Collaborators {
            bridge,
            mut resources,
            mut envelopes,
        } = collaborators;

        let audio_rate = options.audio_rate;
        let sink_id = options.sink_id.clone();

        let tracks: Vec<Track> = specs
            .into_iter()
            .map(|spec| {
                build_track(
                    resources.as_mut(),
                    envelopes.as_mut(),
                    spec,
                    audio_rate,
                    sink_id.as_deref(),
                )
            })
            .collect();

        let pending_loads: HashSet<TrackId> = tracks
            .iter()
            .filter(|t| t.load_state() == LoadState::Pending)
            .map(|t| t.id().clone())
            .collect();

        let control = control_lane(audio_rate, sink_id.as_deref());

        let mut engine = Self {
            min_px_per_sec: options.min_px_per_sec,
            options,
            registry: TrackRegistry::new(tracks, control),
            bridge,
            resources,
            envelopes,
            events,
            clock: SyncClock::new(),
            position: 0.0,
            max_duration: 0.0,
            layout: Layout::compute(0.0, 0.0, 0.0),
            audio_rate,
            sink_id,
            playing: false,
            destroyed: false,
            pending_loads,
            can_play_sent: false,
        };

        engine.recompute_timeline();
        engine.apply_position(0.0, false);

        info!(
            "Multitrack engine created: {} tracks, {} loading, max duration {:.3}s",
            engine.registry.len(),
            engine.pending_loads.len(),
            engine.max_duration
        );

        if engine.pending_loads.is_empty() {
            engine.emit_can_play();
        }

        Ok(engine)
    }

    // ========================================
    // Position application
    // ========================================

    /// Drive every resource to match `global_position`
    ///
    /// Per resource: re-seek when it drifted past the sync tolerance,
    /// play or pause it depending on range and transport state, and
    /// toggle muting from the cue window. Only changed state is written.
    /// The bridge cursor moves only when the position itself changed.
    pub(super) fn apply_position(&mut self, global_position: f64, auto_center: bool) {
        let tolerance = self.options.sync_tolerance;
        let playing = self.playing;
        let apply_gain = self.options.apply_envelope_gain;

        for track in self.registry.all_mut() {
            let local = track.local_time(global_position);
            // Lanes that start later sit at 0, finished ones at their end
            let target = match track.load_state {
                LoadState::Pending => position::seek_target(local),
                LoadState::Ready | LoadState::Failed => {
                    position::seek_target_within(local, track.duration)
                }
            };
            let current = track.resource.current_time();

            if position::needs_correction(current, target, tolerance) {
                trace!(
                    "Correcting {}: resource at {:.3}s, expected {:.3}s",
                    track.id,
                    current,
                    target
                );
                track.resource.set_current_time(target);
            }

            let in_range = track.is_in_range(global_position);
            let should_play = playing && in_range;
            let paused = track.resource.is_paused();
            if should_play && paused {
                track.resource.play();
            } else if !should_play && !paused {
                track.resource.pause();
            }

            let muted = track.cues.is_muted(local);
            if track.resource.is_muted() != muted {
                track.resource.set_muted(muted);
            }

            if apply_gain && in_range {
                let gain = track.target_volume(local).clamp(0.0, 1.0);
                if (track.resource.volume() - gain).abs() > f64::EPSILON {
                    track.resource.set_volume(gain);
                }
            }
        }

        if global_position != self.position {
            self.position = global_position;
            let fraction = position::time_to_fraction(global_position, self.max_duration);
            self.bridge.update_cursor(fraction, auto_center);
        }
    }

    /// Recompute `max_duration` and everything derived from it
    ///
    /// Runs synchronously after every change of a start offset or
    /// duration, so no reader sees a length that disagrees with the
    /// layout or the drag bounds.
    pub(super) fn recompute_timeline(&mut self) {
        let max_duration = self.registry.max_duration();
        if max_duration != self.max_duration {
            debug!(
                "Timeline length: {:.3}s -> {:.3}s",
                self.max_duration, max_duration
            );
        }
        self.max_duration = max_duration;
        self.registry.sync_control(max_duration);
        self.refresh_layout();
    }

    /// Push width, lane offsets and cursor to the bridge
    pub(super) fn refresh_layout(&mut self) {
        self.layout = Layout::compute(
            self.max_duration,
            self.bridge.container_width(),
            self.min_px_per_sec,
        );

        let offsets: Vec<TrackOffset> = self
            .registry
            .iter()
            .map(|t| TrackOffset {
                id: t.id().clone(),
                pixels: self.layout.offset(t.start_position()),
            })
            .collect();

        self.bridge.set_width(self.layout.width);
        self.bridge.set_offsets(&offsets);
        self.bridge.update_cursor(
            position::time_to_fraction(self.position, self.max_duration),
            false,
        );
    }

    // ========================================
    // Sync clock
    // ========================================

    /// Frame the host should run next, if the clock is armed
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.clock.pending()
    }

    /// Run the frame identified by `handle`
    ///
    /// Returns false without doing anything when the handle is stale:
    /// cancelled by `pause()`/`destroy()`, superseded, or already run.
    /// A frame that runs re-arms the clock while playback is active.
    pub fn fire_frame(&mut self, handle: FrameHandle) -> bool {
        if self.destroyed || !self.clock.claim(handle) {
            trace!("Dropping stale frame {}", handle.id());
            return false;
        }

        self.sync_tick();

        if self.playing && !self.destroyed {
            self.clock.schedule();
        }
        true
    }

    /// Run the pending frame, if any
    pub fn on_frame(&mut self) -> bool {
        match self.clock.pending() {
            Some(handle) => self.fire_frame(handle),
            None => false,
        }
    }

    /// One synchronization pass
    ///
    /// Reads back envelope gestures, then treats the furthest-advanced
    /// playing resource as ground truth. The position never decreases.
    pub(super) fn sync_tick(&mut self) {
        self.sync_envelopes();

        let candidate = clock::furthest_position(
            self.position,
            self.registry
                .all()
                .filter(|t| !t.resource.is_paused())
                .map(|t| (t.resource.current_time(), t.start_position())),
        );

        if candidate > self.position {
            self.apply_position(candidate, true);
        }
    }

    // ========================================
    // Events
    // ========================================

    pub(super) fn emit(&self, event: MultitrackEvent) {
        debug!("Emitting {}", event.name());
        self.events.emit_lossy(event);
    }

    pub(super) fn emit_can_play(&mut self) {
        if self.can_play_sent {
            return;
        }
        self.can_play_sent = true;
        info!("All tracks settled, ready to play ({:.3}s)", self.max_duration);
        self.emit(MultitrackEvent::CanPlay {
            max_duration: self.max_duration,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Mark an initial load as settled; emits `canplay` after the last one
    pub(super) fn settle_load(&mut self, id: &TrackId) {
        if self.pending_loads.remove(id) && self.pending_loads.is_empty() {
            self.emit_can_play();
        }
    }

    // ========================================
    // Teardown
    // ========================================

    /// Stop the clock and release every resource
    ///
    /// Idempotent. Every later call on the engine is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        info!("Destroying multitrack engine ({} tracks)", self.registry.len());

        if let Some(handle) = self.clock.cancel() {
            debug!("Cancelled pending frame {}", handle.id());
        }
        self.playing = false;
        self.registry.clear();
        self.pending_loads.clear();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // ========================================
    // Accessors
    // ========================================

    /// Timeline length: `max(start_position + duration)` over all tracks
    pub fn max_duration(&self) -> f64 {
        self.max_duration
    }

    pub fn tracks(&self) -> &TrackRegistry {
        &self.registry
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.registry.get(index)
    }

    pub fn track_by_id(&self, id: &TrackId) -> Option<&Track> {
        self.registry.index_of(id).and_then(|i| self.registry.get(i))
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

/// Internal lane spanning the whole timeline
///
/// Always in range while the playhead is inside the timeline, so the sync
/// clock keeps advancing through gaps between tracks.
fn control_lane(audio_rate: f64, sink_id: Option<&str>) -> Track {
    let mut resource = SilentResource::new(0.0);
    resource.set_playback_rate(audio_rate);
    if let Some(sink) = sink_id {
        resource.set_sink_id(sink);
    }
    Track::bind(TrackSpec::new(TrackId::generate()), Box::new(resource), None)
}

impl std::fmt::Debug for MultitrackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultitrackEngine")
            .field("tracks", &self.registry.len())
            .field("position", &self.position)
            .field("max_duration", &self.max_duration)
            .field("playing", &self.playing)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}
