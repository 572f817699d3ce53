//! Playback resource adapters
//!
//! Every track exclusively owns one playback resource. The engine talks
//! to all of them through [`PlaybackResource`] and never asks which
//! variant it holds; the variant is chosen once, at registration, by a
//! [`ResourceFactory`].

mod file;
mod free_run;
mod probe;
mod silent;

pub use file::FileResource;
pub use probe::{load_durations, probe_duration, LoadOutcome};
pub use silent::SilentResource;

use crate::track::TrackSpec;

/// Uniform contract over one independently-clocked playback element
///
/// Mirrors a media element: the resource keeps its own clock, which the
/// engine reads every frame and overrides only when it drifts.
pub trait PlaybackResource {
    fn play(&mut self);
    fn pause(&mut self);
    /// True when not advancing (paused, never started, or ended)
    fn is_paused(&self) -> bool;

    /// Media time in seconds
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);

    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);

    fn is_muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);

    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);

    /// Media length, or None while metadata is still loading
    fn duration(&self) -> Option<f64>;

    /// Install the final media length
    ///
    /// Called on a load-complete notification, and to keep the control
    /// lane as long as the timeline.
    fn set_duration(&mut self, seconds: f64);

    /// Route output to the given device
    fn set_sink_id(&mut self, sink_id: &str);

    /// Stop and detach the source; the resource is not used afterwards
    fn release(&mut self);
}

/// Chooses and builds the resource variant for a track
pub trait ResourceFactory {
    fn create(&mut self, spec: &TrackSpec) -> Box<dyn PlaybackResource>;
}

/// Default variant selection
///
/// Tracks with a `url` get a [`FileResource`] whose duration arrives later
/// through a load notification; tracks without one get a
/// [`SilentResource`] of the declared duration (0 when absent).
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultResourceFactory;

impl ResourceFactory for DefaultResourceFactory {
    fn create(&mut self, spec: &TrackSpec) -> Box<dyn PlaybackResource> {
        match &spec.url {
            Some(url) => Box::new(FileResource::new(url.clone())),
            None => Box::new(SilentResource::new(spec.duration.unwrap_or(0.0))),
        }
    }
}
