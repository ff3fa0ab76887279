//! Wide time-indexed tables.

use chrono::{NaiveDateTime, SecondsFormat};
use serde::Serialize;

use super::frequency::Frequency;
use super::time::parse_timestamp;
use crate::error::DataShapeError;

const TIMESTAMP_HEADER: &str = "timestamp";

/// One row per timestamp, one `f64` column per entity.
///
/// Missing cells are stored as `NaN`. The index is strictly increasing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesTable {
    index: Vec<NaiveDateTime>,
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TimeSeriesTable {
    /// An empty table with the given columns.
    #[must_use]
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            index: Vec::new(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Assemble a table, checking row widths and index order.
    ///
    /// # Errors
    /// Returns an error if a row has the wrong width or the index is not
    /// strictly increasing.
    pub fn from_parts(
        index: Vec<NaiveDateTime>,
        columns: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, DataShapeError> {
        if index.len() != rows.len() {
            return Err(DataShapeError::RowWidth {
                row: index.len().min(rows.len()),
                expected: columns.len(),
                got: 0,
            });
        }
        for (position, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DataShapeError::RowWidth {
                    row: position,
                    expected: columns.len(),
                    got: row.len(),
                });
            }
        }
        if let Some(position) = index.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(DataShapeError::UnorderedIndex { row: position + 1 });
        }

        Ok(Self {
            index,
            columns,
            rows,
        })
    }

    #[must_use]
    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    /// Values of one column in index order.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let position = self.position(name)?;
        Some(self.rows.iter().map(|row| row[position]).collect())
    }

    /// Values of the column at `position`.
    pub(crate) fn column_at(&self, position: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[position]).collect()
    }

    /// Keep only `entities`, in the order given.
    ///
    /// # Errors
    /// Returns [`DataShapeError::UnknownEntities`] naming every entity that
    /// is not a column.
    pub fn select(&self, entities: &[String]) -> Result<Self, DataShapeError> {
        let unknown: Vec<String> = entities
            .iter()
            .filter(|entity| self.position(entity).is_none())
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(DataShapeError::UnknownEntities { entities: unknown });
        }

        let positions: Vec<usize> = entities
            .iter()
            .filter_map(|entity| self.position(entity))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| positions.iter().map(|&p| row[p]).collect())
            .collect();

        Ok(Self {
            index: self.index.clone(),
            columns: entities.to_vec(),
            rows,
        })
    }

    /// Replace missing cells with the last observed value of their column.
    ///
    /// Leading gaps stay missing.
    pub fn forward_fill(&mut self) {
        let mut last = vec![f64::NAN; self.columns.len()];
        for row in &mut self.rows {
            for (cell, previous) in row.iter_mut().zip(last.iter_mut()) {
                if cell.is_nan() {
                    *cell = *previous;
                } else {
                    *previous = *cell;
                }
            }
        }
    }

    /// Drop every row that still has a missing cell. Returns the number
    /// of rows removed.
    pub fn drop_incomplete(&mut self) -> usize {
        let before = self.rows.len();
        let (index, rows): (Vec<_>, Vec<_>) = std::mem::take(&mut self.index)
            .into_iter()
            .zip(std::mem::take(&mut self.rows))
            .filter(|(_, row)| row.iter().all(|cell| !cell.is_nan()))
            .unzip();
        self.index = index;
        self.rows = rows;
        before - self.rows.len()
    }

    /// Count of missing cells.
    #[must_use]
    pub fn missing_cells(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| cell.is_nan())
            .count()
    }

    /// Observed points of one entity, skipping missing cells.
    ///
    /// # Errors
    /// Returns [`DataShapeError::UnknownEntities`] if the entity is not a
    /// column.
    pub fn series(&self, entity: &str) -> Result<SeriesFrame, DataShapeError> {
        let position = self
            .position(entity)
            .ok_or_else(|| DataShapeError::UnknownEntities {
                entities: vec![entity.to_string()],
            })?;
        let points = self
            .index
            .iter()
            .zip(&self.rows)
            .map(|(timestamp, row)| (*timestamp, row[position]))
            .filter(|(_, value)| !value.is_nan())
            .collect();
        Ok(SeriesFrame {
            entity: entity.to_string(),
            points,
        })
    }

    /// Sample every column onto a regular grid starting at the first
    /// timestamp, carrying the last observed value forward.
    #[must_use]
    pub fn resample(&self, frequency: Frequency) -> Self {
        let (Some(first), Some(last)) = (self.index.first(), self.index.last()) else {
            return Self::empty(self.columns.clone());
        };
        let grid = regular_grid(*first, *last, frequency);

        let mut current = vec![f64::NAN; self.columns.len()];
        let mut source = self.index.iter().zip(&self.rows).peekable();
        let mut rows = Vec::with_capacity(grid.len());
        for point in &grid {
            while let Some((_, row)) = source.next_if(|(timestamp, _)| *timestamp <= point) {
                for (value, cell) in current.iter_mut().zip(row.iter()) {
                    if !cell.is_nan() {
                        *value = *cell;
                    }
                }
            }
            rows.push(current.clone());
        }

        Self {
            index: grid,
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Render as CSV: a `timestamp` column in RFC 3339 UTC followed by one
    /// column per entity. Missing cells are empty.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::from(TIMESTAMP_HEADER);
        for column in &self.columns {
            out.push(',');
            out.push_str(column);
        }
        out.push('\n');

        for (timestamp, row) in self.index.iter().zip(&self.rows) {
            out.push_str(
                &timestamp
                    .and_utc()
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            );
            for cell in row {
                out.push(',');
                if !cell.is_nan() {
                    out.push_str(&cell.to_string());
                }
            }
            out.push('\n');
        }
        out
    }

    /// Parse the output of [`TimeSeriesTable::to_csv`].
    ///
    /// # Errors
    /// Returns [`DataShapeError::Csv`] for malformed input and the usual
    /// shape errors for an unordered index.
    pub fn from_csv(input: &str) -> Result<Self, DataShapeError> {
        let mut lines = input
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines.next().ok_or_else(|| DataShapeError::Csv {
            line: 1,
            reason: "missing header".to_string(),
        })?;
        let mut fields = header.split(',').map(str::trim);
        if fields.next() != Some(TIMESTAMP_HEADER) {
            return Err(DataShapeError::Csv {
                line: 1,
                reason: format!("first column must be '{TIMESTAMP_HEADER}'"),
            });
        }
        let columns: Vec<String> = fields.map(str::to_string).collect();

        let mut index = Vec::new();
        let mut rows = Vec::new();
        for (number, line) in lines {
            let line_no = number + 1;
            let mut fields = line.split(',').map(str::trim);
            let raw_timestamp = fields.next().unwrap_or_default();
            let timestamp = parse_timestamp(raw_timestamp).map_err(|_| DataShapeError::Csv {
                line: line_no,
                reason: format!("invalid timestamp '{raw_timestamp}'"),
            })?;

            let row = fields
                .map(|field| {
                    if field.is_empty() {
                        Ok(f64::NAN)
                    } else {
                        field.parse::<f64>().map_err(|_| DataShapeError::Csv {
                            line: line_no,
                            reason: format!("invalid number '{field}'"),
                        })
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            if row.len() != columns.len() {
                return Err(DataShapeError::Csv {
                    line: line_no,
                    reason: format!("expected {} values, got {}", columns.len(), row.len()),
                });
            }

            index.push(timestamp.naive_utc());
            rows.push(row);
        }

        Self::from_parts(index, columns, rows)
    }
}

/// Observations of a single entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesFrame {
    pub entity: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

impl SeriesFrame {
    #[must_use]
    pub fn new(entity: impl Into<String>, points: Vec<(NaiveDateTime, f64)>) -> Self {
        Self {
            entity: entity.into(),
            points,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, value)| *value)
    }

    /// Sample onto a regular grid starting at the first observation,
    /// taking the last value at or before each grid point.
    #[must_use]
    pub fn resample(&self, frequency: Frequency) -> Self {
        let (Some((first, _)), Some((last, _))) = (self.points.first(), self.points.last()) else {
            return Self::new(self.entity.clone(), Vec::new());
        };

        let mut source = self.points.iter().peekable();
        let mut current = f64::NAN;
        let points = regular_grid(*first, *last, frequency)
            .into_iter()
            .map(|point| {
                while let Some((_, value)) = source.next_if(|(timestamp, _)| *timestamp <= point) {
                    current = *value;
                }
                (point, current)
            })
            .collect();

        Self::new(self.entity.clone(), points)
    }
}

fn regular_grid(first: NaiveDateTime, last: NaiveDateTime, frequency: Frequency) -> Vec<NaiveDateTime> {
    let mut grid = Vec::new();
    let mut point = first;
    while point <= last {
        grid.push(point);
        match point.checked_add_signed(frequency.step()) {
            Some(next) => point = next,
            None => break,
        }
    }
    grid
}
