//! Inbound adapters: ways a user drives the application.

pub mod cli;
