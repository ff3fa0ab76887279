//! Pivot an event log into a wide table.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use tracing::debug;

use super::coerce::{binary_encode, parse_numeric};
use super::event::{entity_domain, RawEvent, BINARY_SENSOR_DOMAIN, SENSOR_DOMAIN};
use super::table::TimeSeriesTable;
use crate::error::{Result, UsageError};

/// How a state string becomes a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Parse as a float; non-numeric states are missing.
    Numeric,
    /// `on` / `off` to 1 / 0; anything else is `NaN`.
    Binary,
}

impl Coercion {
    fn apply(self, state: Option<&str>) -> f64 {
        match self {
            Self::Numeric => state.and_then(parse_numeric).unwrap_or(f64::NAN),
            Self::Binary => binary_encode(state),
        }
    }
}

/// Pivots events of one domain into a [`TimeSeriesTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reshaper {
    domain: String,
    coercion: Coercion,
}

impl Reshaper {
    /// Numeric pivot: forward-filled with incomplete rows dropped.
    pub fn numeric(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            coercion: Coercion::Numeric,
        }
    }

    /// Binary pivot: values in {0, 1, NaN}, no filling.
    pub fn binary(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            coercion: Coercion::Binary,
        }
    }

    /// Pick the coercion that fits a domain.
    pub fn for_domain(domain: &str) -> Self {
        if domain == BINARY_SENSOR_DOMAIN {
            Self::binary(domain)
        } else {
            Self::numeric(domain)
        }
    }

    /// Default reshaper for numeric sensors.
    #[must_use]
    pub fn sensors() -> Self {
        Self::numeric(SENSOR_DOMAIN)
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub const fn coercion(&self) -> Coercion {
        self.coercion
    }

    /// Pivot `events` into a table.
    ///
    /// Events may arrive in any order. For duplicate `(timestamp, entity)`
    /// pairs the later event in `events` wins. Columns are sorted by
    /// entity id.
    ///
    /// # Errors
    /// Returns [`UsageError::DomainMismatch`] if an event belongs to another
    /// domain.
    pub fn reshape(&self, events: &[RawEvent]) -> Result<TimeSeriesTable> {
        if let Some(stray) = events.iter().find(|event| event.domain != self.domain) {
            return Err(UsageError::DomainMismatch {
                expected: self.domain.clone(),
                entity: stray.entity.clone(),
            }
            .into());
        }

        let mut cells: BTreeMap<NaiveDateTime, BTreeMap<&str, f64>> = BTreeMap::new();
        let mut columns: BTreeSet<&str> = BTreeSet::new();
        let mut skipped = 0usize;

        for event in events {
            if event.is_sentinel() {
                skipped += 1;
                continue;
            }
            let value = self.coercion.apply(event.state.as_deref());
            if self.coercion == Coercion::Numeric && value.is_nan() {
                skipped += 1;
                continue;
            }
            columns.insert(event.entity.as_str());
            cells
                .entry(event.timestamp.naive_utc())
                .or_default()
                .insert(event.entity.as_str(), value);
        }

        let columns: Vec<String> = columns.into_iter().map(str::to_string).collect();
        let (index, rows): (Vec<_>, Vec<_>) = cells
            .into_iter()
            .map(|(timestamp, values)| {
                let row = columns
                    .iter()
                    .map(|column| values.get(column.as_str()).copied().unwrap_or(f64::NAN))
                    .collect::<Vec<f64>>();
                (timestamp, row)
            })
            .unzip();

        let mut table = TimeSeriesTable::from_parts(index, columns, rows)?;
        let mut dropped = 0;
        if self.coercion == Coercion::Numeric {
            table.forward_fill();
            dropped = table.drop_incomplete();
        }

        debug!(
            domain = %self.domain,
            events = events.len(),
            skipped,
            dropped,
            rows = table.len(),
            columns = table.columns().len(),
            "reshaped events"
        );
        Ok(table)
    }
}

/// Check that `entities` names at least two distinct entities of one
/// domain and return that domain.
///
/// # Errors
/// Returns a [`UsageError`] for an empty list, fewer than two distinct
/// entities or mixed domains.
pub fn require_single_domain(entities: &[String]) -> std::result::Result<String, UsageError> {
    let Some(first) = entities.first() else {
        return Err(UsageError::EmptyEntityList);
    };
    let distinct = entities.iter().collect::<BTreeSet<_>>().len();
    if distinct < 2 {
        return Err(UsageError::TooFewEntities { count: distinct });
    }

    let mut domains: Vec<String> = Vec::new();
    for entity in entities {
        let domain = entity_domain(entity);
        if !domains.iter().any(|seen| seen == domain) {
            domains.push(domain.to_string());
        }
    }
    if domains.len() > 1 {
        return Err(UsageError::MixedDomains { domains });
    }

    Ok(entity_domain(first).to_string())
}
