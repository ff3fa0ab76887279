//! SQLAlchemy-style database URLs as written in Home Assistant configs.

use std::fmt;

use crate::error::ConfigError;

const SQLITE_SCHEME: &str = "sqlite://";
const MEMORY: &str = ":memory:";

/// A recorder database URL.
///
/// Accepts `dialect[+driver]://...` URLs and bare file paths, which are
/// taken to be SQLite databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseUrl {
    raw: String,
    dialect: String,
    sqlite_path: Option<String>,
}

impl DatabaseUrl {
    /// Parse a URL.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidDatabaseUrl`] when the URL has no
    /// recognisable scheme.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConfigError::InvalidDatabaseUrl {
                url: raw.to_string(),
                reason: "empty url".to_string(),
            });
        }

        let Some((scheme, _)) = raw.split_once("://") else {
            return Ok(Self {
                raw: raw.to_string(),
                dialect: "sqlite".to_string(),
                sqlite_path: Some(raw.to_string()),
            });
        };

        let dialect = scheme
            .split('+')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if dialect.is_empty() {
            return Err(ConfigError::InvalidDatabaseUrl {
                url: raw.to_string(),
                reason: "missing dialect".to_string(),
            });
        }

        if dialect == "sqlite" {
            let rest = raw
                .split_once("://")
                .map_or("", |(_, rest)| rest)
                .split('?')
                .next()
                .unwrap_or_default();
            let path = match rest.strip_prefix('/') {
                None | Some("" | MEMORY) => MEMORY.to_string(),
                Some(path) => path.to_string(),
            };
            return Ok(Self {
                raw: raw.to_string(),
                dialect,
                sqlite_path: Some(path),
            });
        }

        url::Url::parse(raw).map_err(|e| ConfigError::InvalidDatabaseUrl {
            url: redact(raw),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: raw.to_string(),
            dialect,
            sqlite_path: None,
        })
    }

    /// Build a URL for a SQLite file.
    #[must_use]
    pub fn sqlite_file(path: &std::path::Path) -> Self {
        let path = path.display().to_string();
        Self {
            raw: format!("{SQLITE_SCHEME}/{path}"),
            dialect: "sqlite".to_string(),
            sqlite_path: Some(path),
        }
    }

    /// Database family, e.g. `mysql` for `mysql+pymysql://...`.
    #[must_use]
    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.sqlite_path.as_deref() == Some(MEMORY)
    }

    /// Path handed to the SQLite driver.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnsupportedDialect`] for non-SQLite URLs.
    pub fn sqlite_path(&self) -> Result<&str, ConfigError> {
        self.sqlite_path
            .as_deref()
            .ok_or_else(|| ConfigError::UnsupportedDialect {
                dialect: self.dialect.clone(),
            })
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(&self.raw))
    }
}

/// Hide the password of a network URL.
fn redact(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some("***")).is_ok() {
                parsed.to_string()
            } else {
                raw.to_string()
            }
        }
        _ => raw.to_string(),
    }
}
