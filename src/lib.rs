//! hass-detective - explore Home Assistant recorder history.
//!
//! Reads the recorder database of a Home Assistant installation, reshapes
//! state changes into time-series tables and runs analyses on them:
//! pairwise correlations between sensors and short-term forecasts.
//!
//! # Architecture
//!
//! - [`domain`] - Events, tables, reshaping, correlation and forecast types
//! - [`port`] - Traits the application depends on (`StateHistory`, `Forecaster`)
//! - [`application`] - The [`Detective`](application::Detective) service
//! - [`adapter`] - SQLite recorder, Home Assistant config files, Holt-Winters
//!   forecaster and the CLI
//! - [`infrastructure`] - Settings and logging
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use hass_detective::adapter::outbound::hass::DatabaseUrl;
//! use hass_detective::adapter::outbound::sqlite::SqliteStateHistory;
//! use hass_detective::application::Detective;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let url = DatabaseUrl::parse("sqlite:////config/home-assistant_v2.db")?;
//!     let detective = Detective::new(SqliteStateHistory::connect(&url)?);
//!     for record in detective.sensor_correlations()?.iter().take(5) {
//!         println!("{} {:.3}", record.pair, record.coefficient);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
