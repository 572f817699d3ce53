//! # Multitrack Sync Engine
//!
//! Plays several independently-loaded audio resources as one timeline.
//! Each track has its own start offset, duration, cue window and volume
//! envelope; the engine keeps them in lockstep behind a single playhead.
//!
//! **Architecture:**
//! - `timeline`: pure position, cue/fade, drag and layout arithmetic
//! - `resource`: playback resource contract and its variants
//! - `track`: track descriptors and the registry
//! - `clock`: sync clock scheduling
//! - `engine`: the synchronization engine
//! - `driver`: frame loop for hosts without a display refresh callback

pub mod bridge;
pub mod clock;
pub mod config;
pub mod driver;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod resource;
pub mod timeline;
pub mod track;

pub use bridge::{NullBridge, RenderingBridge, TrackOffset};
pub use config::{EngineOptions, SessionConfig};
pub use driver::FrameDriver;
pub use engine::{Collaborators, MultitrackEngine};
pub use envelope::{EnvelopeControl, EnvelopeEvent, EnvelopeFactory, PointEnvelope};
pub use error::{Error, Result};
pub use resource::{PlaybackResource, ResourceFactory};
pub use timeline::DragDecision;
pub use track::{LoadState, Track, TrackSpec};
