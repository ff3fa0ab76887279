//! Resolution of the configuration and recorder database for a command.

use std::path::{Path, PathBuf};

use super::command::Cli;
use super::diagnostic::ConfigFileError;
use crate::adapter::outbound::hass::config::find_config_dir;
use crate::adapter::outbound::hass::DatabaseUrl;
use crate::adapter::outbound::sqlite::SqliteStateHistory;
use crate::application::Detective;
use crate::error::{ConfigError, Error, Result};
use crate::infrastructure::config::Config;

/// Load the config file named on the command line.
///
/// A missing file means defaults. TOML syntax errors are rendered with the
/// offending span.
///
/// # Errors
/// Returns a diagnostic for unreadable or invalid config files.
pub fn load_config(path: &Path) -> miette::Result<Config> {
    if !path.is_file() {
        return Config::load_or_default(path).map_err(super::diagnostic::report);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| super::diagnostic::report(ConfigError::ReadFile(e).into()))?;
    Config::parse_toml(&content).map_err(|err| match &err {
        Error::Config(ConfigError::Parse(parse)) => {
            let (offset, len) = parse
                .span()
                .map_or((0, 0), |span| (span.start, span.end.saturating_sub(span.start)));
            ConfigFileError::new(
                "failed to parse config",
                path.display().to_string(),
                content.clone(),
                offset,
                len,
            )
            .with_help(parse.message().to_string())
            .into()
        }
        _ => super::diagnostic::report(err),
    })
}

/// Database and config choices for one invocation.
#[derive(Debug, Clone)]
pub struct Source {
    config: Config,
    db_url: Option<String>,
    hass_config: Option<PathBuf>,
    limit: Option<usize>,
}

impl Source {
    /// Combine command-line overrides with the loaded configuration.
    #[must_use]
    pub fn new(cli: &Cli, mut config: Config) -> Self {
        if cli.no_limit {
            config.database.unbounded = true;
        }
        if let Some(limit) = cli.limit {
            config.database.limit = usize::try_from(limit).unwrap_or(usize::MAX);
            config.database.unbounded = false;
        }
        let limit = config.database.row_limit();
        Self {
            config,
            db_url: cli.db_url.clone(),
            hass_config: cli.hass_config.clone(),
            limit,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Row limit after `--limit` and `--no-limit`.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Resolve the recorder URL.
    ///
    /// # Errors
    /// See [`Config::database_url`].
    pub fn database_url(&self) -> Result<DatabaseUrl> {
        self.config
            .database_url(self.db_url.as_deref(), self.hass_config.as_deref())
    }

    /// Home Assistant config directory, discovered when not given.
    ///
    /// # Errors
    /// Returns [`ConfigError::HassConfigNotFound`] when none can be found.
    pub fn hass_config_dir(&self) -> Result<PathBuf> {
        match self
            .hass_config
            .as_ref()
            .or(self.config.database.hass_config.as_ref())
        {
            Some(dir) => Ok(dir.clone()),
            None => Ok(find_config_dir()?),
        }
    }

    /// Open the recorder and build the analysis service.
    ///
    /// # Errors
    /// Returns an error if the URL cannot be resolved or the database
    /// cannot be opened.
    pub fn detective(&self) -> Result<Detective<SqliteStateHistory>> {
        let url = self.database_url()?;
        let history = SqliteStateHistory::connect(&url)?;
        Ok(Detective::new(history)
            .with_limit(self.limit)
            .with_pair_mode(self.config.analysis.pair_mode))
    }
}
