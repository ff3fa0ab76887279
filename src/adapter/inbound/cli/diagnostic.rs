//! Miette-based error diagnostics for CLI error presentation.
//!
//! Library errors are mapped onto one diagnostic per concern so every
//! fatal error carries a stable code and, where one exists, a hint on how
//! to recover.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::error::{
    ConfigError as SettingsError, DataShapeError, Error as CrateError, ForecastError,
    UsageError as InputError,
};

/// Configuration file error with source location context.
///
/// Displays the configuration file content with a labeled span pointing
/// to the problematic location.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(hass_detective::config))]
pub struct ConfigFileError {
    pub message: String,

    #[source_code]
    pub src: miette::NamedSource<String>,

    #[label("here")]
    pub span: SourceSpan,

    #[help]
    pub help: Option<String>,
}

impl ConfigFileError {
    /// Create a new configuration error pointing at `len` bytes from
    /// `offset` in the named source.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        name: impl AsRef<str>,
        src: impl Into<String>,
        offset: usize,
        len: usize,
    ) -> Self {
        Self {
            message: message.into(),
            src: miette::NamedSource::new(name, src.into()),
            span: (offset, len).into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Configuration or installation discovery error.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(hass_detective::config))]
pub struct ConfigError {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

/// Invalid arguments, detected before any query runs.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(hass_detective::usage))]
pub struct UsageError {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

/// Recorder database could not be opened or queried.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(
    code(hass_detective::database),
    help("check that the recorder database exists and is readable")
)]
pub struct DatabaseError {
    pub message: String,
}

/// The data did not support the requested analysis.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(hass_detective::data))]
pub struct DataError {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

fn config_help(err: &SettingsError) -> Option<&'static str> {
    match err {
        SettingsError::HassConfigNotFound => {
            Some("pass --hass-config <DIR> or --db-url <URL>")
        }
        SettingsError::DatabaseUrlNotFound { .. } => {
            Some("set recorder.db_url in configuration.yaml or pass --db-url <URL>")
        }
        SettingsError::UnsupportedDialect { .. } => {
            Some("only SQLite recorder databases can be read")
        }
        SettingsError::SecretsFileNotFound { .. } | SettingsError::SecretNotFound { .. } => {
            Some("!secret values are looked up in secrets.yaml next to the including file")
        }
        _ => None,
    }
}

fn usage_help(err: &InputError) -> Option<&'static str> {
    match err {
        InputError::EmptyEntityList | InputError::TooFewEntities { .. } => {
            Some("pass at least two entity ids")
        }
        InputError::MixedDomains { .. } => Some("fetch each domain separately"),
        InputError::TooFewColumns { .. } => {
            Some("correlations need at least two sensors with numeric history")
        }
        InputError::DomainMismatch { .. } => None,
    }
}

fn data_help(err: &CrateError) -> Option<&'static str> {
    match err {
        CrateError::DataShape(DataShapeError::Empty { .. } | DataShapeError::UnknownEntities { .. }) => {
            Some("list recorded entities with `hass-detective entities`")
        }
        CrateError::Forecast(ForecastError::InsufficientData { .. }) => {
            Some("widen the history with --no-limit or choose a finer --freq")
        }
        _ => None,
    }
}

/// Convert a library error into a rendered diagnostic.
#[must_use]
pub fn report(err: CrateError) -> miette::Report {
    let message = err.to_string();
    match &err {
        CrateError::Config(inner) => ConfigError {
            help: config_help(inner).map(str::to_string),
            message,
        }
        .into(),
        CrateError::Yaml(_) | CrateError::Toml(_) => ConfigError {
            help: None,
            message,
        }
        .into(),
        CrateError::Usage(inner) => UsageError {
            help: usage_help(inner).map(str::to_string),
            message,
        }
        .into(),
        CrateError::Connection(_) | CrateError::Database(_) => DatabaseError { message }.into(),
        CrateError::DataShape(_) | CrateError::Forecast(_) | CrateError::Json(_) => DataError {
            help: data_help(&err).map(str::to_string),
            message,
        }
        .into(),
        CrateError::Io(_) => miette::Report::msg(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(report: &miette::Report) -> String {
        report
            .code()
            .map(|code| code.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn errors_get_a_code_per_concern() {
        let usage = report(InputError::TooFewEntities { count: 1 }.into());
        assert_eq!(code(&usage), "hass_detective::usage");
        assert_eq!(usage.to_string(), "must pass more than 1 entity, got 1");

        let config = report(SettingsError::HassConfigNotFound.into());
        assert_eq!(code(&config), "hass_detective::config");
        assert!(config.help().is_some());

        let database = report(CrateError::Connection("no such file".into()));
        assert_eq!(code(&database), "hass_detective::database");

        let data = report(
            DataShapeError::Empty {
                context: "sensor.x".into(),
            }
            .into(),
        );
        assert_eq!(code(&data), "hass_detective::data");
    }

    #[test]
    fn config_file_errors_point_at_the_source() {
        let err = ConfigFileError::new("bad value", "config.toml", "limit = x", 8, 1)
            .with_help("expected an integer");
        assert_eq!(err.span.offset(), 8);
        assert_eq!(err.help.as_deref(), Some("expected an integer"));
    }
}
