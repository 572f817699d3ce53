//! Configuration loading and session file resolution

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Environment variable naming the session file
pub const SESSION_ENV_VAR: &str = "MTRK_SESSION";

/// File name looked up inside the platform config directory
pub const DEFAULT_SESSION_FILE: &str = "session.toml";

/// Session file resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. `<config dir>/mtrk/session.toml`, if it exists
///
/// Returns `Error::NotFound` when none of the sources yields a path.
pub fn resolve_session_path(cli_arg: Option<&Path>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    // Priority 3: platform config directory
    if let Some(path) = default_session_path() {
        if path.exists() {
            return Ok(path);
        }
    }

    Err(Error::NotFound(format!(
        "no session file given and ${} is unset",
        env_var_name
    )))
}

/// Platform default session file location
///
/// - Linux: ~/.config/mtrk/session.toml
/// - macOS: ~/Library/Application Support/mtrk/session.toml
/// - Windows: %APPDATA%\mtrk\session.toml
pub fn default_session_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mtrk").join(DEFAULT_SESSION_FILE))
}

/// Read and deserialize a TOML file
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("failed to read {}: {}", path.display(), e))
    })?;
    let value = toml::from_str(&content)?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(value)
}
