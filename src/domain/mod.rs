//! Storage-agnostic analysis logic.
//!
//! Everything in here works on already-fetched [`RawEvent`]s and the tables
//! built from them; nothing touches the database.

mod catalog;
mod correlation;
mod event;
mod forecast;
mod frequency;
mod reshape;
mod table;

pub mod coerce;
pub mod time;

// Events and discovery
pub use catalog::EntityCatalog;
pub use event::{
    entity_domain, EntityAttributes, RawEvent, BINARY_SENSOR_DOMAIN, SENSOR_DOMAIN,
    SENTINEL_STATES,
};

// Reshaping
pub use reshape::{require_single_domain, Coercion, Reshaper};
pub use table::{SeriesFrame, TimeSeriesTable};

// Analysis
pub use correlation::{
    correlations, pearson, CorrelationMatrix, CorrelationRecord, PairMode,
    PERFECT_CORRELATION_TOLERANCE,
};
pub use forecast::{ForecastKind, ForecastPoint, ForecastTable};
pub use frequency::Frequency;
