//! Outbound adapters: implementations of the outbound ports.

pub mod forecast;
pub mod hass;
pub mod sqlite;
