//! Forecasting model port.

use crate::domain::{ForecastTable, Frequency, SeriesFrame};
use crate::error::Result;

/// A univariate forecasting model.
///
/// The series handed over holds exactly one entity. Implementations return
/// fitted values for the history followed by `periods` predictions spaced
/// `frequency` apart.
pub trait Forecaster {
    /// Model name shown alongside results.
    fn name(&self) -> &str;

    fn forecast(
        &self,
        series: &SeriesFrame,
        periods: usize,
        frequency: Frequency,
    ) -> Result<ForecastTable>;
}
