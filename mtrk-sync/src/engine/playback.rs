//! Transport control for MultitrackEngine
//!
//! **Responsibilities:**
//! - Play/pause and the sync clock's arming and cancellation
//! - Seeking by time and by timeline fraction
//! - Playback rate, zoom and output routing

use tracing::{debug, info, warn};

use super::MultitrackEngine;
use crate::config::validate_audio_rate;
use crate::error::Result;
use crate::timeline::position;

impl MultitrackEngine {
    /// Start playback at the current position and arm the sync clock
    pub fn play(&mut self) {
        if self.destroyed {
            return;
        }
        info!("Play command received at {:.3}s", self.position);

        self.playing = true;
        self.apply_position(self.position, false);

        if !self.clock.is_scheduled() {
            self.clock.schedule();
        }
    }

    /// Stop playback: cancel the pending frame and pause every resource
    pub fn pause(&mut self) {
        if self.destroyed {
            return;
        }
        info!("Pause command received at {:.3}s", self.position);

        if let Some(handle) = self.clock.cancel() {
            debug!("Cancelled pending frame {}", handle.id());
        }
        self.playing = false;
        self.apply_position(self.position, false);
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Global position in seconds
    pub fn get_current_time(&self) -> f64 {
        self.position
    }

    /// Seek to an absolute position (negative input clamps to 0)
    pub fn set_time(&mut self, seconds: f64) {
        if self.destroyed {
            return;
        }
        if !seconds.is_finite() {
            warn!("Ignoring seek to non-finite time {}", seconds);
            return;
        }

        let target = position::seek_target(seconds);
        debug!("Seek to {:.3}s", target);
        self.apply_position(target, false);
    }

    /// Seek to `fraction` of the timeline, clamped to `[0, 1]`
    pub fn seek_to(&mut self, fraction: f64) {
        if self.destroyed {
            return;
        }
        if !fraction.is_finite() {
            warn!("Ignoring seek to non-finite fraction {}", fraction);
            return;
        }
        self.set_time(position::fraction_to_time(fraction, self.max_duration));
    }

    /// Set the zoom floor in pixels per second and re-layout
    pub fn zoom(&mut self, px_per_sec: f64) {
        if self.destroyed {
            return;
        }
        if !(px_per_sec.is_finite() && px_per_sec >= 0.0) {
            warn!("Ignoring invalid zoom level {}", px_per_sec);
            return;
        }

        self.min_px_per_sec = px_per_sec;
        self.refresh_layout();
        debug!(
            "Zoom {} px/s -> effective {:.2} px/s",
            px_per_sec, self.layout.px_per_sec
        );
    }

    pub fn get_audio_rate(&self) -> f64 {
        self.audio_rate
    }

    /// Apply a playback rate to every resource
    ///
    /// Fails with `InvalidArgument` outside `[0.25, 5.0]`, leaving all
    /// resources untouched.
    pub fn set_audio_rate(&mut self, rate: f64) -> Result<()> {
        validate_audio_rate(rate)?;
        if self.destroyed {
            return Ok(());
        }

        info!("Audio rate: {} -> {}", self.audio_rate, rate);
        self.audio_rate = rate;
        for track in self.registry.all_mut() {
            track.resource.set_playback_rate(rate);
        }
        Ok(())
    }

    /// Route every resource (current and future) to an output device
    pub fn set_sink_id(&mut self, sink_id: &str) {
        if self.destroyed {
            return;
        }
        info!("Output sink: {}", sink_id);

        self.sink_id = Some(sink_id.to_string());
        for track in self.registry.all_mut() {
            track.resource.set_sink_id(sink_id);
        }
    }
}
