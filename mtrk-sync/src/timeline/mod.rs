//! Timeline arithmetic: position model, cue policy, drag bounds, layout
//!
//! Everything in here is a pure function of its inputs; the engine owns
//! the state and calls into these modules.

pub mod cue;
pub mod drag;
pub mod layout;
pub mod position;

pub use cue::CueWindow;
pub use drag::{DragBounds, DragDecision};
pub use layout::Layout;
