//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`history`] - In-memory [`StateHistory`](crate::port::outbound::history::StateHistory)
//!   that counts the queries it serves.
//! - [`domain`] - Builders for events and timestamps.
//! - [`recorder`] - Temporary recorder databases with the Home Assistant schema.

pub mod domain;
pub mod history;
pub mod recorder;
