//! Forecast output types.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Whether a point reproduces history or extends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastKind {
    Fitted,
    Predicted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    pub yhat: f64,
    pub kind: ForecastKind,
}

/// Model output for one entity: the fitted history followed by the
/// predicted horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastTable {
    pub entity: String,
    pub model: String,
    pub points: Vec<ForecastPoint>,
}

impl ForecastTable {
    /// Points beyond the last observation.
    pub fn predictions(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points
            .iter()
            .filter(|point| point.kind == ForecastKind::Predicted)
    }

    /// Points covering the observed history.
    pub fn fitted(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points
            .iter()
            .filter(|point| point.kind == ForecastKind::Fitted)
    }
}
