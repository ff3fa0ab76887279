//! Handlers for the `db-url` and `users` commands.

use serde_json::json;
use tabled::{Table, Tabled};

use super::output;
use super::source::Source;
use crate::adapter::outbound::hass::Auth;
use crate::error::Result;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Owner")]
    owner: bool,
    #[tabled(rename = "Active")]
    active: bool,
    #[tabled(rename = "System")]
    system: bool,
}

#[derive(Tabled)]
struct TokenRow {
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Client")]
    client: String,
}

/// Print the resolved recorder URL.
pub fn db_url(source: &Source) -> Result<()> {
    let url = source.database_url()?;

    if output::is_json() {
        output::json_output(json!({
            "command": "db-url",
            "url": url.to_string(),
            "dialect": url.dialect(),
        }));
        return Ok(());
    }
    if output::is_quiet() {
        output::raw(&format!("{url}\n"));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Url", &url);
    output::field("Dialect", url.dialect());
    Ok(())
}

/// List users and refresh tokens from the auth store.
pub fn users(source: &Source) -> Result<()> {
    let dir = source.hass_config_dir()?;
    let auth = Auth::from_config_dir(&dir)?;

    if output::is_json() {
        let users: Vec<_> = auth.users.values().collect();
        let tokens: Vec<_> = auth.refresh_tokens.values().collect();
        output::json_output(json!({
            "command": "users",
            "users": users,
            "refresh_tokens": tokens,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Config", dir.display());

    let users: Vec<UserRow> = auth
        .users
        .values()
        .map(|user| UserRow {
            name: auth.user_name(&user.id),
            id: user.id.clone(),
            owner: user.is_owner,
            active: user.is_active,
            system: user.system_generated,
        })
        .collect();
    output::section(&format!("Users ({})", users.len()));
    output::lines(&Table::new(users).to_string());

    let tokens: Vec<TokenRow> = auth
        .refresh_tokens
        .values()
        .map(|token| TokenRow {
            user: auth.user_name(&token.user.id),
            client: token
                .client_name
                .clone()
                .or_else(|| token.client_id.clone())
                .unwrap_or_default(),
        })
        .collect();
    output::section(&format!("Refresh tokens ({})", tokens.len()));
    output::lines(&Table::new(tokens).to_string());
    Ok(())
}
