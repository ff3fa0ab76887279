//! Builders for domain primitives used across tests.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::domain::RawEvent;

/// Fixed origin for test timestamps: 2023-11-14T22:13:20Z.
pub const EPOCH: i64 = 1_700_000_000;

/// Timestamp `secs` seconds after [`EPOCH`].
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(EPOCH, 0).single().expect("valid epoch") + TimeDelta::seconds(secs)
}

/// Event with a state `secs` seconds after [`EPOCH`].
pub fn event(entity: &str, state: &str, secs: i64) -> RawEvent {
    RawEvent::new(entity, Some(state.to_string()), at(secs))
}

/// Numeric events for one entity, one per minute starting at [`EPOCH`].
pub fn minute_series(entity: &str, values: &[f64]) -> Vec<RawEvent> {
    values
        .iter()
        .zip(0i64..)
        .map(|(value, minute)| event(entity, &value.to_string(), minute * 60))
        .collect()
}

/// Collect string slices into owned entity ids.
pub fn ids(entities: &[&str]) -> Vec<String> {
    entities.iter().map(|e| (*e).to_string()).collect()
}
