//! SQLite adapter for the Home Assistant recorder database.

pub mod database;
pub mod history;

pub use history::SqliteStateHistory;
