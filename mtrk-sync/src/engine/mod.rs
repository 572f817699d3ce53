//! Multitrack synchronization engine
//!
//! **Module Structure:**
//! - `core.rs`: Construction, position application, sync clock frames, teardown
//! - `playback.rs`: Transport (play, pause, seek, rate, zoom, output routing)
//! - `tracks.rs`: Registry lifecycle, load notifications, volume, drag
//! - `cues.rs`: Cue window, fades, envelope read-back, intro and drop lanes

mod core;
mod cues;
mod playback;
mod tracks;

pub use self::core::{Collaborators, MultitrackEngine};
