//! Pixel layout of the timeline
//!
//! The rendering bridge draws every lane on a shared horizontal scale.
//! The scale is the configured zoom, widened when needed so the whole
//! timeline fills the container.

/// Horizontal scale and total width of the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub px_per_sec: f64,
    pub width: f64,
}

impl Layout {
    /// `px_per_sec = max(min_px_per_sec, container_width / max_duration)`
    pub fn compute(max_duration: f64, container_width: f64, min_px_per_sec: f64) -> Self {
        let fit = if max_duration > 0.0 {
            container_width / max_duration
        } else {
            0.0
        };
        let px_per_sec = min_px_per_sec.max(fit).max(0.0);

        Self {
            px_per_sec,
            width: px_per_sec * max_duration,
        }
    }

    /// Pixel offset of a lane starting at `start_position`
    pub fn offset(&self, start_position: f64) -> f64 {
        start_position * self.px_per_sec
    }
}
