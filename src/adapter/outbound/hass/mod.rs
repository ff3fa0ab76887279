//! Home Assistant installation files: configuration, database URLs and
//! the auth store.

pub mod auth;
pub mod config;
pub mod url;

pub use auth::Auth;
pub use url::DatabaseUrl;
