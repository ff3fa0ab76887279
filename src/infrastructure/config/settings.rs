//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct. Configuration is loaded from an
//! optional TOML file, with the database URL overridable through the
//! `HASS_DETECTIVE_DB_URL` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use hass_detective::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("hass-detective.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::logging::LoggingConfig;
use crate::adapter::outbound::hass::config::{db_url_from_config_dir, find_config_dir};
use crate::adapter::outbound::hass::DatabaseUrl;
use crate::domain::PairMode;
use crate::error::{ConfigError, Result};
use crate::port::outbound::history::DEFAULT_LIMIT;

/// Environment variable that overrides `database.url`.
pub const DATABASE_URL_ENV: &str = "HASS_DETECTIVE_DB_URL";

/// Recorder database settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Explicit recorder URL. Takes precedence over `hass_config`.
    pub url: Option<String>,
    /// Home Assistant config directory used to discover the URL.
    pub hass_config: Option<PathBuf>,
    /// Maximum number of rows fetched per query.
    pub limit: usize,
    /// Fetch every row regardless of `limit`.
    pub unbounded: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            hass_config: None,
            limit: DEFAULT_LIMIT,
            unbounded: false,
        }
    }
}

impl DatabaseConfig {
    /// Row limit to apply to queries, `None` when unbounded.
    #[must_use]
    pub const fn row_limit(&self) -> Option<usize> {
        if self.unbounded {
            None
        } else {
            Some(self.limit)
        }
    }
}

/// Analysis defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub pair_mode: PairMode,
    /// Samples per season for Holt-Winters; linear trend when unset.
    pub season_length: Option<usize>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// `HASS_DETECTIVE_DB_URL`, when set, replaces `database.url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        let config = config.with_env_url(std::env::var(DATABASE_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` when it exists, otherwise start from defaults.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] for an existing file.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            return Self::load(path);
        }
        debug!(path = %path.display(), "no config file, using defaults");
        let config = Self::default().with_env_url(std::env::var(DATABASE_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply an environment override for the database URL.
    #[must_use]
    pub fn with_env_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|url| !url.trim().is_empty()) {
            self.database.url = Some(url);
        }
        self
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.database.limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.limit",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if let Some(url) = &self.database.url {
            DatabaseUrl::parse(url)?;
        }
        if let Some(length) = self.analysis.season_length {
            if length < 2 {
                return Err(ConfigError::InvalidValue {
                    field: "analysis.season_length",
                    reason: format!("must be at least 2, got {length}"),
                }
                .into());
            }
        }
        self.logging.validate()?;
        Ok(())
    }

    /// Resolve the recorder URL.
    ///
    /// Precedence: `url` argument, then `database.url`, then the recorder
    /// section of the Home Assistant config at `hass_config` (argument or
    /// configured), then the auto-discovered config directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is malformed or no config directory
    /// can be found.
    pub fn database_url(&self, url: Option<&str>, hass_config: Option<&Path>) -> Result<DatabaseUrl> {
        if let Some(url) = url.or(self.database.url.as_deref()) {
            return Ok(DatabaseUrl::parse(url)?);
        }
        let dir = match hass_config.or(self.database.hass_config.as_deref()) {
            Some(dir) => dir.to_path_buf(),
            None => find_config_dir()?,
        };
        debug!(config_dir = %dir.display(), "discovering database url");
        Ok(db_url_from_config_dir(&dir)?)
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
