use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("failed to parse YAML file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("secrets file {path} not found")]
    SecretsFileNotFound { path: String },

    #[error("secret {name} not found")]
    SecretNotFound { name: String },

    #[error("YAML tag {tag} is not supported")]
    UnsupportedTag { tag: String },

    #[error("unable to automatically find the location of the Home Assistant config, please pass it in")]
    HassConfigNotFound,

    #[error("unable to determine database url from Home Assistant config at {path}")]
    DatabaseUrlNotFound { path: String },

    #[error("invalid database url '{url}': {reason}")]
    InvalidDatabaseUrl { url: String, reason: String },

    #[error("unsupported database dialect '{dialect}' (only sqlite is available)")]
    UnsupportedDialect { dialect: String },

    #[error("failed to parse auth store {path}: {source}")]
    Auth {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Caller mistakes that are detected before any query runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("no entities were given")]
    EmptyEntityList,

    #[error("must pass more than 1 entity, got {count}")]
    TooFewEntities { count: usize },

    #[error("entities must be from the same domain, got: {}", domains.join(", "))]
    MixedDomains { domains: Vec<String> },

    #[error("entity {entity} is not in domain {expected}")]
    DomainMismatch { expected: String, entity: String },

    #[error("at least 2 columns are needed to correlate, got {count}")]
    TooFewColumns { count: usize },
}

/// Errors raised when a table does not have the shape an operation needs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataShapeError {
    #[error("entities not present in the table: {}", entities.join(", "))]
    UnknownEntities { entities: Vec<String> },

    #[error("no data for {context}")]
    Empty { context: String },

    #[error("table rows must have {expected} values, row {row} has {got}")]
    RowWidth {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("timestamps must be strictly increasing (row {row})")]
    UnorderedIndex { row: usize },

    #[error("invalid timestamp '{value}'")]
    InvalidTimestamp { value: String },

    #[error("malformed CSV at line {line}: {reason}")]
    Csv { line: usize, reason: String },
}

/// Errors raised by forecasting models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid frequency '{0}'")]
    InvalidFrequency(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    DataShape(#[from] DataShapeError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_name_the_offending_input() {
        let err = UsageError::MixedDomains {
            domains: vec!["light".into(), "switch".into()],
        };
        assert_eq!(
            err.to_string(),
            "entities must be from the same domain, got: light, switch"
        );

        let err = UsageError::TooFewEntities { count: 1 };
        assert_eq!(err.to_string(), "must pass more than 1 entity, got 1");
    }

    #[test]
    fn data_shape_errors_list_missing_entities() {
        let err: Error = DataShapeError::UnknownEntities {
            entities: vec!["sensor.a".into(), "sensor.b".into()],
        }
        .into();
        assert_eq!(
            err.to_string(),
            "entities not present in the table: sensor.a, sensor.b"
        );
    }

    #[test]
    fn diesel_errors_become_database_errors() {
        let err: Error = diesel::result::Error::NotFound.into();
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn parser_errors_convert() {
        let yaml = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
        assert!(matches!(Error::from(yaml), Error::Yaml(_)));

        let toml = toml::from_str::<toml::Table>("a = ").unwrap_err();
        assert!(matches!(Error::from(toml), Error::Toml(_)));
    }
}
