//! Free-running media clock
//!
//! Models how an independent playback element keeps time: once started
//! it advances on the monotonic clock, scaled by its playback rate, and
//! stops by itself at the end of the media. Two resources started at
//! "the same" moment therefore drift, which the sync clock corrects.

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub(crate) struct FreeRunClock {
    /// Media time at the anchor instant
    anchor_time: f64,
    /// Set while running
    anchor_instant: Option<Instant>,
    rate: f64,
    /// Media length; the clock halts here. None = unbounded
    limit: Option<f64>,
}

impl FreeRunClock {
    pub(crate) fn new(limit: Option<f64>) -> Self {
        Self {
            anchor_time: 0.0,
            anchor_instant: None,
            rate: 1.0,
            limit,
        }
    }

    fn raw_time(&self) -> f64 {
        match self.anchor_instant {
            Some(at) => self.anchor_time + at.elapsed().as_secs_f64() * self.rate,
            None => self.anchor_time,
        }
    }

    /// Current media time, capped at the media length
    pub(crate) fn time(&self) -> f64 {
        let t = self.raw_time();
        match self.limit {
            Some(limit) => t.min(limit),
            None => t,
        }
    }

    /// True while started and not yet at the end of the media
    pub(crate) fn is_running(&self) -> bool {
        if self.anchor_instant.is_none() {
            return false;
        }
        match self.limit {
            Some(limit) => self.raw_time() < limit,
            None => true,
        }
    }

    pub(crate) fn start(&mut self) {
        if self.anchor_instant.is_none() {
            self.anchor_time = self.time();
            self.anchor_instant = Some(Instant::now());
        }
    }

    pub(crate) fn stop(&mut self) {
        self.anchor_time = self.time();
        self.anchor_instant = None;
    }

    pub(crate) fn seek(&mut self, seconds: f64) {
        self.anchor_time = match self.limit {
            Some(limit) => seconds.clamp(0.0, limit),
            None => seconds.max(0.0),
        };
        if self.anchor_instant.is_some() {
            self.anchor_instant = Some(Instant::now());
        }
    }

    pub(crate) fn rate(&self) -> f64 {
        self.rate
    }

    /// Change rate without a jump in media time
    pub(crate) fn set_rate(&mut self, rate: f64) {
        self.anchor_time = self.time();
        if self.anchor_instant.is_some() {
            self.anchor_instant = Some(Instant::now());
        }
        self.rate = rate;
    }

    pub(crate) fn limit(&self) -> Option<f64> {
        self.limit
    }

    pub(crate) fn set_limit(&mut self, limit: Option<f64>) {
        self.anchor_time = self.raw_time();
        if self.anchor_instant.is_some() {
            self.anchor_instant = Some(Instant::now());
        }
        self.limit = limit;
        if let Some(limit) = limit {
            self.anchor_time = self.anchor_time.min(limit);
        }
    }
}
