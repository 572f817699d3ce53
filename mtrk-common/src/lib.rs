//! # Multitrack Common Library
//!
//! Shared code for the multitrack sync engine and its host binary:
//! - Track identity and envelope point types
//! - Event types (MultitrackEvent enum) and the EventBus
//! - Fade curve definitions and calculations
//! - Configuration file resolution

pub mod config;
pub mod error;
pub mod events;
pub mod fade_curves;
pub mod types;

pub use error::{Error, Result};
pub use fade_curves::FadeCurve;
pub use types::{EnvelopePoint, TrackId};
