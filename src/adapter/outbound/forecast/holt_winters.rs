//! Holt-Winters forecasting backed by `anofox-forecast`.
//!
//! With a season length and at least two full seasons of history the
//! additive Holt-Winters model is fitted; otherwise Holt's linear trend.
//! Smoothing parameters are optimised on the series unless fixed with
//! [`HoltWintersForecaster::new`].

use anofox_forecast::core::TimeSeries;
use anofox_forecast::models::exponential::{HoltLinearTrend, HoltWinters, SeasonalType};
use anofox_forecast::models::Forecaster as Model;
use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::{ForecastKind, ForecastPoint, ForecastTable, Frequency, SeriesFrame};
use crate::error::{ForecastError, Result};
use crate::port::outbound::forecast::Forecaster;

/// Model name reported through [`Forecaster::name`].
pub const MODEL_NAME: &str = "holt-winters";

/// Fixed smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Smoothing {
    alpha: f64,
    beta: f64,
    gamma: f64,
}

/// Holt-Winters forecaster; parameters are fitted per series by default.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoltWintersForecaster {
    smoothing: Option<Smoothing>,
    season_length: Option<usize>,
}

impl HoltWintersForecaster {
    /// Create a forecaster with fixed smoothing parameters.
    ///
    /// # Errors
    /// Returns an error unless every parameter lies in `(0, 1)`.
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        for (name, value) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ForecastError::InvalidParameter(format!(
                    "{name} must be in (0, 1), got {value}"
                ))
                .into());
            }
        }
        Ok(Self {
            smoothing: Some(Smoothing { alpha, beta, gamma }),
            season_length: None,
        })
    }

    /// Number of samples per season.
    ///
    /// # Errors
    /// Returns an error for a season shorter than two samples.
    pub fn with_season_length(mut self, season_length: Option<usize>) -> Result<Self> {
        if let Some(length) = season_length {
            if length < 2 {
                return Err(ForecastError::InvalidParameter(format!(
                    "season length must be at least 2, got {length}"
                ))
                .into());
            }
        }
        self.season_length = season_length;
        Ok(self)
    }

    #[must_use]
    pub const fn season_length(&self) -> Option<usize> {
        self.season_length
    }

    /// Pick the model for a series of `len` observations and describe it.
    fn model(&self, len: usize) -> (Box<dyn Model>, String) {
        match self.season_length {
            Some(m) if len >= 2 * m => {
                let model = match self.smoothing {
                    Some(s) => HoltWinters::additive(s.alpha, s.beta, s.gamma, m),
                    None => HoltWinters::auto(m, SeasonalType::Additive),
                };
                (Box::new(model), format!("{MODEL_NAME}(additive, m={m})"))
            }
            _ => {
                let model = match self.smoothing {
                    Some(s) => HoltLinearTrend::new(s.alpha, s.beta),
                    None => HoltLinearTrend::auto(),
                };
                (Box::new(model), "holt-linear".to_string())
            }
        }
    }
}

fn model_error(err: anofox_forecast::ForecastError) -> ForecastError {
    match err {
        anofox_forecast::ForecastError::InsufficientData { needed, got, .. } => {
            ForecastError::InsufficientData { needed, got }
        }
        other => ForecastError::InvalidParameter(other.to_string()),
    }
}

impl Forecaster for HoltWintersForecaster {
    fn name(&self) -> &str {
        MODEL_NAME
    }

    fn forecast(
        &self,
        series: &SeriesFrame,
        periods: usize,
        frequency: Frequency,
    ) -> Result<ForecastTable> {
        let (timestamps, values): (Vec<NaiveDateTime>, Vec<f64>) = series
            .points
            .iter()
            .filter(|(_, value)| value.is_finite())
            .copied()
            .unzip();
        let Some(&last) = timestamps.last() else {
            return Err(ForecastError::InsufficientData { needed: 2, got: 0 }.into());
        };

        let input = TimeSeries::univariate(
            timestamps.iter().map(|timestamp| timestamp.and_utc()).collect(),
            values,
        )
        .map_err(model_error)?;
        let (mut model, description) = self.model(input.len());
        model.fit(&input).map_err(model_error)?;
        let fitted = model
            .fitted_values()
            .ok_or_else(|| ForecastError::InvalidParameter("model produced no fitted values".into()))?
            .to_vec();
        let predicted = model.predict(periods).map_err(model_error)?;
        debug!(model = %description, observations = input.len(), periods, "fitted forecast model");

        let mut points: Vec<ForecastPoint> = timestamps
            .iter()
            .zip(fitted)
            .map(|(timestamp, yhat)| ForecastPoint {
                timestamp: *timestamp,
                yhat,
                kind: ForecastKind::Fitted,
            })
            .collect();

        let mut next = last;
        for &yhat in predicted.primary() {
            next = next.checked_add_signed(frequency.step()).ok_or_else(|| {
                ForecastError::InvalidParameter("forecast horizon overflows the calendar".into())
            })?;
            points.push(ForecastPoint {
                timestamp: next,
                yhat,
                kind: ForecastKind::Predicted,
            });
        }

        Ok(ForecastTable {
            entity: series.entity.clone(),
            model: description,
            points,
        })
    }
}
