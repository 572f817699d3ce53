//! File-backed resource
//!
//! Holds a media path whose metadata loads asynchronously. Until the
//! load-complete notification installs a duration the resource is not
//! playable: `play` is ignored and `duration` reports None.

use std::path::{Path, PathBuf};

use super::free_run::FreeRunClock;
use super::PlaybackResource;

#[derive(Debug, Clone)]
pub struct FileResource {
    /// None once released (source detached)
    source: Option<PathBuf>,
    clock: FreeRunClock,
    loaded: bool,
    volume: f64,
    muted: bool,
    sink_id: Option<String>,
}

impl FileResource {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(source.into()),
            clock: FreeRunClock::new(Some(0.0)),
            loaded: false,
            volume: 1.0,
            muted: false,
            sink_id: None,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn sink_id(&self) -> Option<&str> {
        self.sink_id.as_deref()
    }
}

impl PlaybackResource for FileResource {
    fn play(&mut self) {
        if self.loaded && self.source.is_some() {
            self.clock.start();
        }
    }

    fn pause(&mut self) {
        self.clock.stop();
    }

    fn is_paused(&self) -> bool {
        !self.clock.is_running()
    }

    fn current_time(&self) -> f64 {
        self.clock.time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.clock.seek(seconds);
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn playback_rate(&self) -> f64 {
        self.clock.rate()
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.clock.set_rate(rate);
    }

    fn duration(&self) -> Option<f64> {
        if self.loaded {
            self.clock.limit()
        } else {
            None
        }
    }

    fn set_duration(&mut self, seconds: f64) {
        self.clock.set_limit(Some(seconds.max(0.0)));
        self.loaded = true;
    }

    fn set_sink_id(&mut self, sink_id: &str) {
        self.sink_id = Some(sink_id.to_string());
    }

    fn release(&mut self) {
        self.clock.stop();
        self.source = None;
        self.loaded = false;
    }
}
