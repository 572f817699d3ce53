//! Error types for mtrk-sync
//!
//! Only conditions the caller must react to are errors. Unknown track ids,
//! resources that have not finished loading and out-of-bounds drags are
//! absorbed by the engine and never surface here.

use thiserror::Error;

/// Main error type for the sync engine
#[derive(Error, Debug)]
pub enum Error {
    /// Argument outside its accepted range (e.g. playback rate)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Engine options or session file failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a media file's metadata failed
    #[error("Probe error: {0}")]
    Probe(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors from the shared library (config loading, parsing)
    #[error(transparent)]
    Common(#[from] mtrk_common::Error),
}

/// Convenience Result type using mtrk-sync Error
pub type Result<T> = std::result::Result<T, Error>;
