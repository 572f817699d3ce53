//! Rendering bridge seam
//!
//! The visual layer lives outside this crate. It receives layout and
//! cursor updates through [`RenderingBridge`] and drives the engine back
//! through `on_drag`, `seek_to` and `handle_drop`.

use mtrk_common::TrackId;

/// Pixel offset of one lane
#[derive(Debug, Clone, PartialEq)]
pub struct TrackOffset {
    pub id: TrackId,
    pub pixels: f64,
}

/// Consumer of position and layout updates
pub trait RenderingBridge {
    /// Visible width of the scrolling container in pixels
    fn container_width(&self) -> f64;

    /// Total pixel width of the timeline
    fn set_width(&mut self, total_pixels: f64);

    /// Horizontal offset of every lane
    fn set_offsets(&mut self, offsets: &[TrackOffset]);

    /// Move the playhead cursor to `fraction` of the timeline
    ///
    /// `auto_center` asks the view to keep the cursor centered rather
    /// than merely visible (set for clock-driven updates).
    fn update_cursor(&mut self, fraction: f64, auto_center: bool);
}

/// Bridge for headless use: fixed container width, discards updates
#[derive(Debug, Clone, Copy)]
pub struct NullBridge {
    container_width: f64,
}

impl NullBridge {
    pub fn new(container_width: f64) -> Self {
        Self { container_width }
    }
}

impl Default for NullBridge {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

impl RenderingBridge for NullBridge {
    fn container_width(&self) -> f64 {
        self.container_width
    }

    fn set_width(&mut self, _total_pixels: f64) {}

    fn set_offsets(&mut self, _offsets: &[TrackOffset]) {}

    fn update_cursor(&mut self, _fraction: f64, _auto_center: bool) {}
}
