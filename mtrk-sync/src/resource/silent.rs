//! Synthesized silent resource
//!
//! Produces no audio but keeps time exactly like a media element. Used
//! for placeholder lanes and for the engine's control lane.

use super::free_run::FreeRunClock;
use super::PlaybackResource;

#[derive(Debug, Clone)]
pub struct SilentResource {
    clock: FreeRunClock,
    volume: f64,
    muted: bool,
    sink_id: Option<String>,
}

impl SilentResource {
    /// Ready immediately with the given length
    pub fn new(duration: f64) -> Self {
        Self {
            clock: FreeRunClock::new(Some(duration.max(0.0))),
            volume: 1.0,
            muted: false,
            sink_id: None,
        }
    }

    pub fn sink_id(&self) -> Option<&str> {
        self.sink_id.as_deref()
    }
}

impl PlaybackResource for SilentResource {
    fn play(&mut self) {
        self.clock.start();
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
        self.clock.limit()
    }

    fn set_duration(&mut self, seconds: f64) {
        self.clock.set_limit(Some(seconds.max(0.0)));
    }

    fn set_sink_id(&mut self, sink_id: &str) {
        self.sink_id = Some(sink_id.to_string());
    }

    fn release(&mut self) {
        self.clock.stop();
        self.clock.seek(0.0);
    }
}
