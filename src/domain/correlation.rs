//! Pairwise Pearson correlation.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::table::TimeSeriesTable;
use crate::error::UsageError;

/// Coefficients this close to ±1 are treated as perfect correlation.
pub const PERFECT_CORRELATION_TOLERANCE: f64 = 1e-12;

/// Which ordered pairs of the matrix survive flattening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairMode {
    /// Each unordered pair once, labelled in column order.
    #[default]
    Unordered,
    /// Both `A-B` and `B-A`.
    Ordered,
}

impl fmt::Display for PairMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unordered => f.write_str("unordered"),
            Self::Ordered => f.write_str("ordered"),
        }
    }
}

impl FromStr for PairMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unordered" => Ok(Self::Unordered),
            "ordered" => Ok(Self::Ordered),
            other => Err(format!("unknown pair mode '{other}'")),
        }
    }
}

/// A labelled correlation coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationRecord {
    pub pair: String,
    pub coefficient: f64,
}

/// Pearson coefficient of two equally long samples.
///
/// Returns `NaN` for fewer than two points or a zero-variance input.
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    if 1.0 - r.abs() <= PERFECT_CORRELATION_TOLERANCE {
        r.signum()
    } else {
        r
    }
}

/// Square Pearson matrix over the columns of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Compute the matrix for every column pair.
    ///
    /// # Errors
    /// Returns [`UsageError::TooFewColumns`] for fewer than two columns.
    pub fn pearson(table: &TimeSeriesTable) -> Result<Self, UsageError> {
        let width = table.columns().len();
        if width < 2 {
            return Err(UsageError::TooFewColumns { count: width });
        }

        let data: Vec<Vec<f64>> = (0..width).map(|i| table.column_at(i)).collect();
        let mut values = vec![vec![f64::NAN; width]; width];
        for i in 0..width {
            for j in i..width {
                let r = pearson(&data[i], &data[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(Self {
            columns: table.columns().to_vec(),
            values,
        })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Coefficient between two named columns.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    /// Flatten into records labelled `"{a}-{b}"`, sorted by coefficient
    /// descending.
    ///
    /// Self pairs, `NaN` and perfect ±1 coefficients are removed, as are
    /// exact `(label, coefficient)` duplicates.
    #[must_use]
    pub fn flatten(&self, mode: PairMode) -> Vec<CorrelationRecord> {
        let width = self.columns.len();
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for i in 0..width {
            let start = match mode {
                PairMode::Unordered => i + 1,
                PairMode::Ordered => 0,
            };
            for j in start..width {
                if i == j {
                    continue;
                }
                let coefficient = self.values[i][j];
                if coefficient.is_nan() || coefficient.abs() == 1.0 {
                    continue;
                }
                let pair = format!("{}-{}", self.columns[i], self.columns[j]);
                if seen.insert((pair.clone(), coefficient.to_bits())) {
                    records.push(CorrelationRecord { pair, coefficient });
                }
            }
        }

        records.sort_by(|a, b| b.coefficient.total_cmp(&a.coefficient));
        records
    }
}

/// Correlate every column pair of a numeric table.
///
/// # Errors
/// Returns [`UsageError::TooFewColumns`] for fewer than two columns.
pub fn correlations(
    table: &TimeSeriesTable,
    mode: PairMode,
) -> Result<Vec<CorrelationRecord>, UsageError> {
    Ok(CorrelationMatrix::pearson(table)?.flatten(mode))
}
