//! Track descriptors and the track registry
//!
//! A [`TrackSpec`] is what a caller hands in (also what a session file
//! deserializes into). A [`Track`] is the engine's live record: the spec's
//! mutable attributes plus the exclusively-owned playback resource and
//! optional envelope collaborator.

use mtrk_common::{EnvelopePoint, TrackId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::envelope::EnvelopeControl;
use crate::error::{Error, Result};
use crate::resource::PlaybackResource;
use crate::timeline::{position, CueWindow};

/// Labelled point on a lane, drawn by the rendering bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub time: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Intro region of a lane (from the lane start to `end_time`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intro {
    pub end_time: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_volume() -> f64 {
    1.0
}

/// Caller-side description of a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSpec {
    #[serde(default = "TrackId::generate")]
    pub id: TrackId,
    /// Media source; None makes a silent placeholder lane
    #[serde(default)]
    pub url: Option<String>,
    /// Length of a silent lane (ignored for file lanes)
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub start_position: f64,
    #[serde(default)]
    pub draggable: bool,
    #[serde(default)]
    pub start_cue: Option<f64>,
    #[serde(default)]
    pub end_cue: Option<f64>,
    #[serde(default)]
    pub fade_in_end: Option<f64>,
    #[serde(default)]
    pub fade_out_start: Option<f64>,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default)]
    pub envelope: Vec<EnvelopePoint>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub intro: Option<Intro>,
}

impl TrackSpec {
    /// Empty placeholder lane (no source, zero length)
    pub fn new(id: impl Into<TrackId>) -> Self {
        Self {
            id: id.into(),
            url: None,
            duration: None,
            start_position: 0.0,
            draggable: false,
            start_cue: None,
            end_cue: None,
            fade_in_end: None,
            fade_out_start: None,
            volume: 1.0,
            envelope: Vec::new(),
            markers: Vec::new(),
            intro: None,
        }
    }

    /// Synthesized silent lane of known length
    pub fn silent(id: impl Into<TrackId>, duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::new(id)
        }
    }

    /// File-backed lane; its length arrives with the load notification
    pub fn file(id: impl Into<TrackId>, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::new(id)
        }
    }

    pub fn at(mut self, start_position: f64) -> Self {
        self.start_position = start_position;
        self
    }

    pub fn draggable(mut self) -> Self {
        self.draggable = true;
        self
    }

    pub fn with_cues(mut self, start_cue: Option<f64>, end_cue: Option<f64>) -> Self {
        self.start_cue = start_cue;
        self.end_cue = end_cue;
        self
    }

    pub fn with_fades(mut self, fade_in_end: Option<f64>, fade_out_start: Option<f64>) -> Self {
        self.fade_in_end = fade_in_end;
        self.fade_out_start = fade_out_start;
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_envelope(mut self, points: Vec<EnvelopePoint>) -> Self {
        self.envelope = points;
        self
    }

    pub fn with_intro(mut self, intro: Intro) -> Self {
        self.intro = Some(intro);
        self
    }

    /// Reject numbers no timeline arithmetic can absorb
    ///
    /// Every time and volume must be finite, and a declared duration
    /// must not be negative. Out-of-range volumes are fine (they clamp).
    pub fn validate(&self) -> Result<()> {
        let invalid = |what: &str, value: f64| {
            Err(Error::InvalidArgument(format!(
                "track {}: {} must be finite, got {}",
                self.id, what, value
            )))
        };

        if !self.start_position.is_finite() {
            return invalid("start_position", self.start_position);
        }
        if !self.volume.is_finite() {
            return invalid("volume", self.volume);
        }
        if let Some(duration) = self.duration {
            if !duration.is_finite() {
                return invalid("duration", duration);
            }
            if duration < 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "track {}: duration must not be negative, got {}",
                    self.id, duration
                )));
            }
        }

        let cues = [
            ("start_cue", self.start_cue),
            ("end_cue", self.end_cue),
            ("fade_in_end", self.fade_in_end),
            ("fade_out_start", self.fade_out_start),
        ];
        for (what, value) in cues {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return invalid(what, v);
            }
        }

        for point in &self.envelope {
            if !point.time.is_finite() {
                return invalid("envelope point time", point.time);
            }
            if !point.volume.is_finite() {
                return invalid("envelope point volume", point.volume);
            }
        }
        for marker in &self.markers {
            if !marker.time.is_finite() {
                return invalid("marker time", marker.time);
            }
        }
        if let Some(intro) = &self.intro {
            if !intro.end_time.is_finite() {
                return invalid("intro end", intro.end_time);
            }
        }
        Ok(())
    }
}

/// Metadata state of a track's resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Metadata not yet available; duration counts as 0
    Pending,
    Ready,
    /// Never playable; duration stays 0
    Failed,
}

/// Live track record owned by the engine
pub struct Track {
    pub(crate) id: TrackId,
    pub(crate) url: Option<String>,
    pub(crate) start_position: f64,
    pub(crate) duration: f64,
    pub(crate) load_state: LoadState,
    pub(crate) draggable: bool,
    pub(crate) cues: CueWindow,
    pub(crate) volume: f64,
    pub(crate) envelope_points: Vec<EnvelopePoint>,
    pub(crate) markers: Vec<Marker>,
    pub(crate) intro: Option<Intro>,
    pub(crate) resource: Box<dyn PlaybackResource>,
    pub(crate) envelope: Option<Box<dyn EnvelopeControl>>,
}

impl Track {
    /// Bind a spec to its freshly created resource and envelope
    pub(crate) fn bind(
        spec: TrackSpec,
        resource: Box<dyn PlaybackResource>,
        envelope: Option<Box<dyn EnvelopeControl>>,
    ) -> Self {
        let (duration, load_state) = match resource.duration() {
            Some(d) if d.is_finite() && d >= 0.0 => (d, LoadState::Ready),
            _ => (0.0, LoadState::Pending),
        };

        Self {
            id: spec.id,
            url: spec.url,
            start_position: spec.start_position,
            duration,
            load_state,
            draggable: spec.draggable,
            cues: CueWindow {
                start_cue: spec.start_cue,
                end_cue: spec.end_cue,
                fade_in_end: spec.fade_in_end,
                fade_out_start: spec.fade_out_start,
            },
            volume: spec.volume.clamp(0.0, 1.0),
            envelope_points: spec.envelope,
            markers: spec.markers,
            intro: spec.intro,
            resource,
            envelope,
        }
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn start_position(&self) -> f64 {
        self.start_position
    }

    /// Length used by all timeline arithmetic (0 until loaded)
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    pub fn cues(&self) -> &CueWindow {
        &self.cues
    }

    pub fn start_cue(&self) -> Option<f64> {
        self.cues.start_cue
    }

    pub fn end_cue(&self) -> Option<f64> {
        self.cues.end_cue
    }

    pub fn fade_in_end(&self) -> Option<f64> {
        self.cues.fade_in_end
    }

    pub fn fade_out_start(&self) -> Option<f64> {
        self.cues.fade_out_start
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn envelope_points(&self) -> &[EnvelopePoint] {
        &self.envelope_points
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn intro(&self) -> Option<&Intro> {
        self.intro.as_ref()
    }

    pub fn resource(&self) -> &dyn PlaybackResource {
        self.resource.as_ref()
    }

    pub fn local_time(&self, global_position: f64) -> f64 {
        position::local_time(global_position, self.start_position)
    }

    pub fn is_in_range(&self, global_position: f64) -> bool {
        position::is_in_range(self.local_time(global_position), self.duration)
    }

    /// Audible iff in range and inside the cue window
    pub fn is_audible(&self, global_position: f64) -> bool {
        self.is_in_range(global_position)
            && !self.cues.is_muted(self.local_time(global_position))
    }

    /// Volume the resource should play at for `local_time`
    ///
    /// The envelope collaborator decides when it has points; otherwise the
    /// track's baseline volume applies.
    pub(crate) fn target_volume(&self, local_time: f64) -> f64 {
        self.envelope
            .as_ref()
            .and_then(|env| env.volume_at(local_time))
            .unwrap_or(self.volume)
    }

    /// Stop and detach the resource
    pub(crate) fn release(&mut self) {
        self.resource.pause();
        self.resource.release();
    }
}

impl std::fmt::Debug for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Track")
            .field("id", &self.id)
            .field("start_position", &self.start_position)
            .field("duration", &self.duration)
            .field("load_state", &self.load_state)
            .field("draggable", &self.draggable)
            .field("cues", &self.cues)
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}

/// Ordered set of tracks plus the internal control lane
///
/// User-visible indexes address `tracks`; the control lane is not
/// indexable from outside but takes part in every per-resource pass.
pub struct TrackRegistry {
    tracks: Vec<Track>,
    control: Option<Track>,
}

impl TrackRegistry {
    pub(crate) fn new(tracks: Vec<Track>, control: Track) -> Self {
        Self {
            tracks,
            control: Some(control),
        }
    }

    /// Number of user tracks (the control lane is not counted)
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn index_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn control(&self) -> Option<&Track> {
        self.control.as_ref()
    }

    /// User tracks followed by the control lane
    pub(crate) fn all(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().chain(self.control.iter())
    }

    pub(crate) fn all_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.tracks.iter_mut().chain(self.control.iter_mut())
    }

    /// Swap in a new record at `index`, returning the old one
    pub(crate) fn replace(&mut self, index: usize, track: Track) -> Option<Track> {
        let slot = self.tracks.get_mut(index)?;
        Some(std::mem::replace(slot, track))
    }

    /// `max(start + duration)` over user tracks
    pub fn max_duration(&self) -> f64 {
        position::max_duration(self.tracks.iter().map(|t| (t.start_position, t.duration)))
    }

    /// Keep the control lane exactly as long as the timeline
    pub(crate) fn sync_control(&mut self, max_duration: f64) {
        if let Some(control) = self.control.as_mut() {
            if control.duration != max_duration {
                debug!("Control lane resized: {:.3}s -> {:.3}s", control.duration, max_duration);
                control.duration = max_duration;
                control.resource.set_duration(max_duration);
            }
        }
    }

    /// Release every resource and drop all records
    pub(crate) fn clear(&mut self) {
        for track in self.all_mut() {
            track.release();
        }
        self.tracks.clear();
        self.control = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::SilentResource;

    fn silent_track(id: &str, start: f64, duration: f64) -> Track {
        Track::bind(
            TrackSpec::silent(id, duration).at(start),
            Box::new(SilentResource::new(duration)),
            None,
        )
    }

    #[test]
    fn test_spec_from_toml_defaults() {
        let spec: TrackSpec = toml::from_str("id = \"vox\"\nurl = \"vox.flac\"").unwrap();
        assert_eq!(spec.id, TrackId::from("vox"));
        assert_eq!(spec.volume, 1.0);
        assert!(!spec.draggable);
        assert_eq!(spec.start_position, 0.0);
        assert!(spec.envelope.is_empty());
    }

    #[test]
    fn test_spec_without_id_gets_generated_one() {
        let a: TrackSpec = toml::from_str("duration = 3.0").unwrap();
        let b: TrackSpec = toml::from_str("duration = 3.0").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_validate_rejects_non_finite_numbers() {
        assert!(TrackSpec::silent("a", 10.0).with_volume(1.7).validate().is_ok());

        let bad = [
            TrackSpec::silent("a", 10.0).at(f64::INFINITY),
            TrackSpec::silent("a", f64::NAN),
            TrackSpec::silent("a", -1.0),
            TrackSpec::silent("a", 10.0).with_volume(f64::NAN),
            TrackSpec::silent("a", 10.0).with_cues(None, Some(f64::NEG_INFINITY)),
            TrackSpec::silent("a", 10.0).with_fades(Some(f64::NAN), None),
            TrackSpec::silent("a", 10.0).with_envelope(vec![EnvelopePoint::new(f64::NAN, 0.5)]),
        ];
        for spec in bad {
            assert!(
                matches!(spec.validate(), Err(Error::InvalidArgument(_))),
                "{:?} passed validation",
                spec
            );
        }
    }

    #[test]
    fn test_spec_with_inf_from_toml_fails_validation() {
        let spec: TrackSpec = toml::from_str("id = \"x\"\nstart_position = inf").unwrap();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_bind_marks_unknown_duration_pending() {
        let pending = Track::bind(
            TrackSpec::file("a", "a.wav"),
            Box::new(crate::resource::FileResource::new("a.wav")),
            None,
        );
        assert_eq!(pending.load_state(), LoadState::Pending);
        assert_eq!(pending.duration(), 0.0);

        let ready = silent_track("b", 0.0, 4.0);
        assert_eq!(ready.load_state(), LoadState::Ready);
        assert_eq!(ready.duration(), 4.0);
    }

    #[test]
    fn test_audibility_combines_range_and_cues() {
        let mut track = silent_track("a", 2.0, 10.0);
        track.cues.start_cue = Some(1.0);

        assert!(!track.is_audible(2.5)); // local 0.5, before cue
        assert!(track.is_audible(4.0)); // local 2.0
        assert!(!track.is_audible(12.0)); // local 10.0, out of range
    }

    #[test]
    fn test_registry_max_duration_and_control_lane() {
        let control = silent_track("control", 0.0, 0.0);
        let mut registry = TrackRegistry::new(
            vec![silent_track("a", 0.0, 10.0), silent_track("b", 5.0, 10.0)],
            control,
        );

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.max_duration(), 15.0);

        registry.sync_control(15.0);
        let control = registry.control().unwrap();
        assert_eq!(control.duration(), 15.0);
        assert_eq!(control.resource().duration(), Some(15.0));
        assert_eq!(registry.all().count(), 3);
    }

    #[test]
    fn test_registry_replace_keeps_index() {
        let mut registry =
            TrackRegistry::new(vec![silent_track("a", 0.0, 1.0)], silent_track("c", 0.0, 0.0));
        let old = registry.replace(0, silent_track("a", 0.0, 7.0)).unwrap();
        assert_eq!(old.duration(), 1.0);
        assert_eq!(registry.get(0).unwrap().duration(), 7.0);
        assert!(registry.replace(5, silent_track("x", 0.0, 1.0)).is_none());
    }

    #[test]
    fn test_empty_registry_has_zero_length() {
        let registry = TrackRegistry::new(Vec::new(), silent_track("c", 0.0, 0.0));
        assert!(registry.is_empty());
        assert_eq!(registry.max_duration(), 0.0);
    }
}
