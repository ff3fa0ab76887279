//! SQLite database modules.
//!
//! Connection pooling, recorder schema declarations and Diesel row types.

pub mod connection;
pub mod model;
pub mod schema;
