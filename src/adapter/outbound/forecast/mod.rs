//! Built-in forecasting models.

pub mod holt_winters;

pub use holt_winters::HoltWintersForecaster;
