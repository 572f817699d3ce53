//! Engine options and session files

use std::path::Path;

use mtrk_common::FadeCurve;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::timeline::drag::DEFAULT_DRAG_SLACK;
use crate::timeline::position::DEFAULT_SYNC_TOLERANCE;
use crate::track::TrackSpec;

/// Accepted playback rate range (inclusive)
pub const MIN_AUDIO_RATE: f64 = 0.25;
pub const MAX_AUDIO_RATE: f64 = 5.0;

/// Engine tuning
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Zoom floor in pixels per second (0 = always fit the container)
    pub min_px_per_sec: f64,
    /// Forbid dragging a lane before the timeline origin
    pub drag_bounds: bool,
    /// Drift tolerated before a resource is re-seeked (seconds)
    pub sync_tolerance: f64,
    /// Extra seconds a lane may hang before the origin when unbounded
    pub drag_slack: f64,
    /// Initial playback rate for every resource
    pub audio_rate: f64,
    /// Frames per second for [`crate::driver::FrameDriver`]
    pub frame_rate: f64,
    /// Push envelope-derived volume to resources on every position update
    pub apply_envelope_gain: bool,
    /// Curve used by the default envelope between points
    pub envelope_curve: FadeCurve,
    /// Output device for every resource
    pub sink_id: Option<String>,
    /// Per-subscriber event buffer
    pub event_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            min_px_per_sec: 0.0,
            drag_bounds: false,
            sync_tolerance: DEFAULT_SYNC_TOLERANCE,
            drag_slack: DEFAULT_DRAG_SLACK,
            audio_rate: 1.0,
            frame_rate: 60.0,
            apply_envelope_gain: true,
            envelope_curve: FadeCurve::Linear,
            sink_id: None,
            event_capacity: 256,
        }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> Result<()> {
        validate_audio_rate(self.audio_rate)?;

        if !(self.sync_tolerance.is_finite() && self.sync_tolerance > 0.0) {
            return Err(Error::Config(format!(
                "sync_tolerance must be positive, got {}",
                self.sync_tolerance
            )));
        }
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(Error::Config(format!(
                "frame_rate must be positive, got {}",
                self.frame_rate
            )));
        }
        if !(self.min_px_per_sec.is_finite() && self.min_px_per_sec >= 0.0) {
            return Err(Error::Config(format!(
                "min_px_per_sec must be non-negative, got {}",
                self.min_px_per_sec
            )));
        }
        if !(self.drag_slack.is_finite() && self.drag_slack >= 0.0) {
            return Err(Error::Config(format!(
                "drag_slack must be non-negative, got {}",
                self.drag_slack
            )));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Frame period for the driver
    pub fn frame_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.frame_rate)
    }
}

/// Reject rates outside `[MIN_AUDIO_RATE, MAX_AUDIO_RATE]`
pub fn validate_audio_rate(rate: f64) -> Result<()> {
    if (MIN_AUDIO_RATE..=MAX_AUDIO_RATE).contains(&rate) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "audio rate {} outside [{}, {}]",
            rate, MIN_AUDIO_RATE, MAX_AUDIO_RATE
        )))
    }
}

/// Session file: engine options plus the initial tracks
///
/// ```toml
/// [options]
/// drag_bounds = true
///
/// [[tracks]]
/// id = "drums"
/// url = "drums.flac"
/// draggable = true
///
/// [[tracks]]
/// id = "drop-here"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub options: EngineOptions,
    pub tracks: Vec<TrackSpec>,
}

impl SessionConfig {
    /// Load and validate a session file
    ///
    /// Relative track urls are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let mut session: SessionConfig = mtrk_common::config::load_toml(path)?;
        session.options.validate()?;

        if let Some(base) = path.parent() {
            for track in &mut session.tracks {
                if let Some(url) = &track.url {
                    if Path::new(url).is_relative() {
                        track.url = Some(base.join(url).to_string_lossy().into_owned());
                    }
                }
            }
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let options = EngineOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.sync_tolerance, 0.3);
        assert_eq!(options.drag_slack, 1.0);
        assert!(!options.drag_bounds);
    }

    #[test]
    fn test_rate_range_is_inclusive() {
        assert!(validate_audio_rate(0.25).is_ok());
        assert!(validate_audio_rate(5.0).is_ok());
        assert!(matches!(validate_audio_rate(0.1), Err(Error::InvalidArgument(_))));
        assert!(matches!(validate_audio_rate(5.01), Err(Error::InvalidArgument(_))));
        assert!(validate_audio_rate(f64::NAN).is_err());
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = EngineOptions {
            sync_tolerance: 0.0,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::Config(_))));

        let options = EngineOptions {
            audio_rate: 9.0,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_partial_options_table() {
        let options: EngineOptions = toml::from_str("drag_bounds = true\nenvelope_curve = \"s_curve\"").unwrap();
        assert!(options.drag_bounds);
        assert_eq!(options.envelope_curve, FadeCurve::SCurve);
        assert_eq!(options.frame_rate, 60.0);
    }

    #[test]
    fn test_session_load_resolves_relative_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[options]\ndrag_bounds = true\n\n[[tracks]]\nid = \"a\"\nurl = \"a.wav\"\n\n[[tracks]]\nid = \"b\"\nduration = 4.0"
        )
        .unwrap();

        let session = SessionConfig::load(&path).unwrap();
        assert!(session.options.drag_bounds);
        assert_eq!(session.tracks.len(), 2);
        assert_eq!(
            session.tracks[0].url.as_deref(),
            Some(dir.path().join("a.wav").to_string_lossy().as_ref())
        );
        assert_eq!(session.tracks[1].url, None);
    }

    #[test]
    fn test_session_with_invalid_options_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[options]\nframe_rate = -1.0\n").unwrap();
        assert!(matches!(SessionConfig::load(&path), Err(Error::Config(_))));
    }
}
