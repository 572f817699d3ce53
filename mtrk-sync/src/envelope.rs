//! Volume envelope collaborator
//!
//! The engine never interpolates volume itself. It pushes point updates
//! into an [`EnvelopeControl`], asks it for the gain at a local time, and
//! reads back the events its user gestures produced.

use mtrk_common::{EnvelopePoint, FadeCurve};

use crate::track::TrackSpec;

/// Notification read back from an envelope collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeEvent {
    /// The user moved, added or removed points
    PointsChanged(Vec<EnvelopePoint>),
    /// The user changed the lane's overall volume
    VolumeChanged(f64),
}

/// Envelope collaborator contract
pub trait EnvelopeControl {
    /// Current points, ordered by time
    fn points(&self) -> Vec<EnvelopePoint>;

    /// Programmatic replacement of all points (queues no event)
    fn set_points(&mut self, points: Vec<EnvelopePoint>);

    fn volume(&self) -> f64;

    /// Programmatic volume change (queues no event)
    fn set_volume(&mut self, volume: f64);

    /// Gain implied by the points at `local_time`, None without points
    fn volume_at(&self, local_time: f64) -> Option<f64>;

    /// User gesture: move one point
    fn drag_point(&mut self, index: usize, time: f64, volume: f64);

    /// User gesture: change the overall volume
    fn drag_volume(&mut self, volume: f64);

    /// Take the events queued since the last call, oldest first
    fn drain_events(&mut self) -> Vec<EnvelopeEvent>;
}

/// Builds the envelope collaborator for a track, if it gets one
pub trait EnvelopeFactory {
    fn create(&mut self, spec: &TrackSpec) -> Option<Box<dyn EnvelopeControl>>;
}

/// Gives every track a [`PointEnvelope`] with the configured curve
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultEnvelopeFactory {
    pub curve: FadeCurve,
}

impl EnvelopeFactory for DefaultEnvelopeFactory {
    fn create(&mut self, spec: &TrackSpec) -> Option<Box<dyn EnvelopeControl>> {
        let mut envelope = PointEnvelope::new(self.curve);
        envelope.set_volume(spec.volume);
        Some(Box::new(envelope))
    }
}

/// In-memory envelope interpolating between points with a fade curve
#[derive(Debug, Clone, Default)]
pub struct PointEnvelope {
    points: Vec<EnvelopePoint>,
    volume: f64,
    curve: FadeCurve,
    pending: Vec<EnvelopeEvent>,
}

impl PointEnvelope {
    pub fn new(curve: FadeCurve) -> Self {
        Self {
            points: Vec::new(),
            volume: 1.0,
            curve,
            pending: Vec::new(),
        }
    }

    fn sort(&mut self) {
        self.points.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
}

impl EnvelopeControl for PointEnvelope {
    fn points(&self) -> Vec<EnvelopePoint> {
        self.points.clone()
    }

    fn set_points(&mut self, points: Vec<EnvelopePoint>) {
        self.points = points;
        self.sort();
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn volume_at(&self, local_time: f64) -> Option<f64> {
        let first = self.points.first()?;
        let last = self.points.last()?;

        if local_time <= first.time {
            return Some(first.volume);
        }
        if local_time >= last.time {
            return Some(last.volume);
        }

        // Points are sorted; find the segment containing local_time
        let seg = self
            .points
            .windows(2)
            .find(|w| local_time >= w[0].time && local_time <= w[1].time)?;
        let (a, b) = (&seg[0], &seg[1]);
        let span = b.time - a.time;
        if span <= 0.0 {
            return Some(b.volume);
        }
        Some(self.curve.interpolate(a.volume, b.volume, (local_time - a.time) / span))
    }

    fn drag_point(&mut self, index: usize, time: f64, volume: f64) {
        let Some(point) = self.points.get_mut(index) else {
            return;
        };
        point.time = time.max(0.0);
        point.volume = volume.clamp(0.0, 1.0);
        self.sort();
        self.pending.push(EnvelopeEvent::PointsChanged(self.points.clone()));
    }

    fn drag_volume(&mut self, volume: f64) {
        self.set_volume(volume);
        self.pending.push(EnvelopeEvent::VolumeChanged(self.volume));
    }

    fn drain_events(&mut self) -> Vec<EnvelopeEvent> {
        std::mem::take(&mut self.pending)
    }
}
