//! Users and refresh tokens from the Home Assistant auth store.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Location of the auth store inside a config directory.
pub const AUTH_STORE: &str = ".storage/auth";

#[derive(Debug, Deserialize)]
struct AuthFile {
    data: AuthData,
}

#[derive(Debug, Deserialize)]
struct AuthData {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    refresh_tokens: Vec<StoredToken>,
}

#[derive(Debug, Deserialize)]
struct StoredToken {
    id: String,
    user_id: String,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    client_name: Option<String>,
}

/// A Home Assistant user account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub system_generated: bool,
}

/// A refresh token with its owning user resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshToken {
    pub id: String,
    pub user: User,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
}

/// Users and refresh tokens indexed by id.
#[derive(Debug, Clone, Default)]
pub struct Auth {
    pub users: BTreeMap<String, User>,
    pub refresh_tokens: BTreeMap<String, RefreshToken>,
}

impl Auth {
    /// Load the auth store of a config directory.
    ///
    /// # Errors
    /// See [`Auth::load`].
    pub fn from_config_dir(config_dir: &Path) -> Result<Self, ConfigError> {
        Self::load(&config_dir.join(AUTH_STORE))
    }

    /// Load an auth store file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid auth
    /// store.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&content).map_err(|source| ConfigError::Auth {
            path: path.display().to_string(),
            source,
        })
    }

    fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let file: AuthFile = serde_json::from_str(content)?;

        let users: BTreeMap<String, User> = file
            .data
            .users
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();

        let mut refresh_tokens = BTreeMap::new();
        for token in file.data.refresh_tokens {
            let Some(user) = users.get(&token.user_id) else {
                warn!(token = %token.id, user = %token.user_id, "refresh token for unknown user");
                continue;
            };
            refresh_tokens.insert(
                token.id.clone(),
                RefreshToken {
                    id: token.id,
                    user: user.clone(),
                    client_id: token.client_id,
                    client_name: token.client_name,
                },
            );
        }

        Ok(Self {
            users,
            refresh_tokens,
        })
    }

    /// Display name of a user, or `Unknown user (<id>)`.
    #[must_use]
    pub fn user_name(&self, user_id: &str) -> String {
        match self.users.get(user_id) {
            Some(user) => user.name.clone().unwrap_or_else(|| user.id.clone()),
            None => format!("Unknown user ({user_id})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const STORE: &str = r#"{
        "version": 1,
        "key": "auth",
        "data": {
            "users": [
                {"id": "u1", "name": "Paulus", "is_owner": true, "is_active": true, "system_generated": false},
                {"id": "u2", "name": null, "is_owner": false, "is_active": true, "system_generated": true}
            ],
            "groups": [],
            "credentials": [],
            "refresh_tokens": [
                {"id": "t1", "user_id": "u1", "client_id": "https://home.example/", "client_name": null, "token_type": "normal"},
                {"id": "t2", "user_id": "ghost", "client_id": null, "client_name": "CLI"}
            ]
        }
    }"#;

    #[test]
    fn indexes_users_and_tokens() {
        let auth = Auth::parse(STORE).unwrap();

        assert_eq!(auth.users.len(), 2);
        assert!(auth.users["u1"].is_owner);
        assert_eq!(auth.refresh_tokens.len(), 1);
        assert_eq!(auth.refresh_tokens["t1"].user.id, "u1");
        assert_eq!(
            auth.refresh_tokens["t1"].client_id.as_deref(),
            Some("https://home.example/")
        );
    }

    #[test]
    fn user_names_fall_back() {
        let auth = Auth::parse(STORE).unwrap();
        assert_eq!(auth.user_name("u1"), "Paulus");
        assert_eq!(auth.user_name("u2"), "u2");
        assert_eq!(auth.user_name("nobody"), "Unknown user (nobody)");
    }

    #[test]
    fn loads_from_config_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".storage")).unwrap();
        fs::write(dir.path().join(AUTH_STORE), STORE).unwrap();

        let auth = Auth::from_config_dir(dir.path()).unwrap();
        assert_eq!(auth.user_name("u1"), "Paulus");
    }

    #[test]
    fn malformed_store_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("auth");
        fs::write(&path, "{\"data\": 5}").unwrap();

        let err = Auth::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Auth { .. }));
        assert!(err.to_string().contains("auth"));
    }
}
