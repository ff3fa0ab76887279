//! Path utilities for hass-detective.
//!
//! User settings live under `~/.hass-detective/`:
//! - `~/.hass-detective/config.toml` - main configuration

use std::path::PathBuf;

/// Returns the hass-detective home directory (`~/.hass-detective/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".hass-detective")
}

/// Returns the default config file path (`~/.hass-detective/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}
