//! Analysis service over a recorder history.
//!
//! Every operation runs one query against the injected [`StateHistory`],
//! materializes the rows and hands them to the domain transforms. Nothing
//! is cached between calls.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::domain::{
    correlations, entity_domain, require_single_domain, CorrelationRecord, EntityAttributes,
    EntityCatalog, ForecastTable, Frequency, PairMode, RawEvent, Reshaper, SeriesFrame,
    TimeSeriesTable, BINARY_SENSOR_DOMAIN, SENSOR_DOMAIN,
};
use crate::error::{DataShapeError, Result, UsageError};
use crate::port::outbound::forecast::Forecaster;
use crate::port::outbound::history::{StateHistory, StateQuery, DEFAULT_LIMIT};

/// Entry point for exploring recorded states.
#[derive(Debug, Clone)]
pub struct Detective<H> {
    history: H,
    limit: Option<usize>,
    pair_mode: PairMode,
}

impl<H: StateHistory> Detective<H> {
    /// Create a service with the default row limit and pair mode.
    pub fn new(history: H) -> Self {
        Self {
            history,
            limit: Some(DEFAULT_LIMIT),
            pair_mode: PairMode::default(),
        }
    }

    /// Cap on rows fetched per query; `None` lifts the cap.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_pair_mode(mut self, pair_mode: PairMode) -> Self {
        self.pair_mode = pair_mode;
        self
    }

    #[must_use]
    pub fn history(&self) -> &H {
        &self.history
    }

    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    #[must_use]
    pub const fn pair_mode(&self) -> PairMode {
        self.pair_mode
    }

    fn fetch(&self, query: StateQuery) -> Result<Vec<RawEvent>> {
        let query = query.with_limit(self.limit);
        let events = self.history.fetch_states(&query)?;
        debug!(rows = events.len(), limit = ?query.limit, "fetched states");
        Ok(events)
    }

    /// Entities with recorded data, grouped by domain.
    pub fn catalog(&self) -> Result<EntityCatalog> {
        let catalog = EntityCatalog::build(self.history.entity_ids()?);
        info!(
            entities = catalog.entity_count(),
            domains = catalog.domains().count(),
            "entities with data"
        );
        Ok(catalog)
    }

    /// Display metadata for each entity of `domain` (or every entity),
    /// taken from its most recent state.
    pub fn describe_entities(&self, domain: Option<&str>) -> Result<Vec<EntityAttributes>> {
        let query = domain.map_or_else(StateQuery::all, StateQuery::domain);
        let mut latest: BTreeMap<String, RawEvent> = BTreeMap::new();
        for event in self.fetch(query)? {
            let newer = latest
                .get(&event.entity)
                .map_or(true, |seen| event.timestamp > seen.timestamp);
            if newer {
                latest.insert(event.entity.clone(), event);
            }
        }
        Ok(latest.values().map(EntityAttributes::from_event).collect())
    }

    /// Table for an explicit list of entities of one domain.
    ///
    /// Binary sensors are encoded on/off, every other domain is parsed as
    /// numbers. The list is validated before any query runs.
    ///
    /// # Errors
    /// Returns a usage error for an empty, single-entity or mixed-domain
    /// list, and [`DataShapeError::UnknownEntities`] when a requested
    /// entity has no usable data.
    pub fn fetch_by_list(&self, entities: &[String]) -> Result<TimeSeriesTable> {
        let domain = require_single_domain(entities)?;
        let requested: Vec<String> = entities
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let events = self.fetch(StateQuery::entities(requested.clone()))?;
        let table = Reshaper::for_domain(&domain).reshape(&events)?;
        Ok(table.select(&requested)?)
    }

    /// Every numeric sensor, aligned and complete.
    pub fn numeric_sensors(&self) -> Result<TimeSeriesTable> {
        let events = self.fetch(StateQuery::domain(SENSOR_DOMAIN))?;
        let table = Reshaper::numeric(SENSOR_DOMAIN).reshape(&events)?;
        info!(
            sensors = table.columns().len(),
            rows = table.len(),
            "numeric sensors"
        );
        Ok(table)
    }

    /// Every binary sensor as 0/1 with unrecognised states kept as NaN.
    pub fn binary_sensors(&self) -> Result<TimeSeriesTable> {
        let events = self.fetch(StateQuery::domain(BINARY_SENSOR_DOMAIN))?;
        let table = Reshaper::binary(BINARY_SENSOR_DOMAIN).reshape(&events)?;
        info!(
            sensors = table.columns().len(),
            rows = table.len(),
            "binary sensors"
        );
        Ok(table)
    }

    /// Pairwise correlations between all numeric sensors.
    pub fn sensor_correlations(&self) -> Result<Vec<CorrelationRecord>> {
        let table = self.numeric_sensors()?;
        self.correlate(&table)
    }

    /// Pairwise correlations of an already reshaped table.
    pub fn correlate(&self, table: &TimeSeriesTable) -> Result<Vec<CorrelationRecord>> {
        let records = correlations(table, self.pair_mode)?;
        debug!(pairs = records.len(), mode = %self.pair_mode, "correlated");
        Ok(records)
    }

    /// Observed values of a single entity.
    ///
    /// # Errors
    /// Returns [`DataShapeError::Empty`] when the entity has no usable
    /// states.
    pub fn single_entity_series(&self, entity: &str) -> Result<SeriesFrame> {
        let entity = entity.trim();
        if entity.is_empty() {
            return Err(UsageError::EmptyEntityList.into());
        }
        let events = self.fetch(StateQuery::entities(vec![entity.to_string()]))?;
        let table = Reshaper::for_domain(entity_domain(entity)).reshape(&events)?;

        let series = match table.series(entity) {
            Ok(series) => series,
            Err(DataShapeError::UnknownEntities { .. }) => SeriesFrame::new(entity, Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if series.is_empty() {
            return Err(DataShapeError::Empty {
                context: entity.to_string(),
            }
            .into());
        }
        Ok(series)
    }

    /// Series of several entities taken from one aligned table, so they
    /// share a time base. A single entity is read on its own.
    ///
    /// # Errors
    /// See [`Detective::fetch_by_list`] and
    /// [`Detective::single_entity_series`].
    pub fn aligned_series(&self, entities: &[String]) -> Result<Vec<SeriesFrame>> {
        let mut requested: Vec<&String> = Vec::with_capacity(entities.len());
        for entity in entities {
            if !requested.contains(&entity) {
                requested.push(entity);
            }
        }
        if let [entity] = requested.as_slice() {
            return Ok(vec![self.single_entity_series(entity)?]);
        }

        let table = self.fetch_by_list(entities)?;
        requested
            .into_iter()
            .map(|entity| table.series(entity).map_err(Into::into))
            .collect()
    }

    /// Resample one entity to `frequency` and hand it to `model`.
    pub fn forecast<F: Forecaster + ?Sized>(
        &self,
        model: &F,
        entity: &str,
        periods: usize,
        frequency: Frequency,
    ) -> Result<ForecastTable> {
        let series = self.single_entity_series(entity)?.resample(frequency);
        info!(
            entity,
            model = model.name(),
            points = series.len(),
            periods,
            %frequency,
            "forecasting"
        );
        model.forecast(&series, periods, frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::history::InMemoryHistory;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn event(entity: &str, state: &str, secs: i64) -> RawEvent {
        RawEvent::new(entity, Some(state.to_string()), at(secs))
    }

    fn ids(entities: &[&str]) -> Vec<String> {
        entities.iter().map(|e| (*e).to_string()).collect()
    }

    #[test]
    fn short_lists_are_rejected_before_querying() {
        let history = InMemoryHistory::new(vec![event("sensor.a", "1", 0)]);
        let detective = Detective::new(&history);

        let err = detective.fetch_by_list(&ids(&["sensor.a"])).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Usage(UsageError::TooFewEntities { count: 1 })
        ));
        let err = detective
            .fetch_by_list(&ids(&["sensor.a", "sensor.a"]))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Usage(UsageError::TooFewEntities { count: 1 })
        ));
        let err = detective
            .fetch_by_list(&ids(&["sensor.a", "light.b"]))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Usage(UsageError::MixedDomains { .. })
        ));
        assert_eq!(history.queries(), 0);
    }

    #[test]
    fn aligned_series_share_the_table_index() {
        let history = InMemoryHistory::new(vec![
            event("sensor.temp", "20.0", 0),
            event("sensor.temp", "21.0", 60),
            event("sensor.humidity", "50.0", 0),
            event("sensor.humidity", "49.0", 120),
        ]);
        let detective = Detective::new(&history);

        let series = detective
            .aligned_series(&ids(&["sensor.temp", "sensor.humidity"]))
            .unwrap();
        assert_eq!(history.queries(), 1);
        assert_eq!(series[0].entity, "sensor.temp");
        assert_eq!(series[0].values().collect::<Vec<_>>(), vec![20.0, 21.0, 21.0]);
        assert_eq!(series[1].values().collect::<Vec<_>>(), vec![50.0, 50.0, 49.0]);
        assert_eq!(
            series[0].points.iter().map(|p| p.0).collect::<Vec<_>>(),
            series[1].points.iter().map(|p| p.0).collect::<Vec<_>>()
        );

        let single = detective.aligned_series(&ids(&["sensor.temp", "sensor.temp"])).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].len(), 2);

        let err = detective
            .aligned_series(&ids(&["sensor.temp", "sensor.nowhere"]))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::DataShape(DataShapeError::UnknownEntities { ref entities })
                if entities == &ids(&["sensor.nowhere"])
        ));
    }

    #[test]
    fn fetch_by_list_aligns_requested_entities() {
        let history = InMemoryHistory::new(vec![
            event("sensor.temp", "20.0", 0),
            event("sensor.temp", "21.0", 60),
            event("sensor.humidity", "50.0", 0),
            event("sensor.other", "1.0", 0),
        ]);
        let detective = Detective::new(&history);

        let table = detective
            .fetch_by_list(&ids(&["sensor.temp", "sensor.humidity"]))
            .unwrap();

        assert_eq!(table.columns(), &ids(&["sensor.humidity", "sensor.temp"]));
        assert_eq!(table.rows(), &[vec![50.0, 21.0]]);
        assert_eq!(history.queries(), 1);
    }

    #[test]
    fn fetch_by_list_reports_entities_without_data() {
        let history = InMemoryHistory::new(vec![event("sensor.a", "1", 0)]);
        let detective = Detective::new(&history);

        let err = detective
            .fetch_by_list(&ids(&["sensor.a", "sensor.missing"]))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::DataShape(DataShapeError::UnknownEntities { ref entities })
                if entities == &ids(&["sensor.missing"])
        ));
    }

    #[test]
    fn binary_lists_use_on_off_encoding() {
        let history = InMemoryHistory::new(vec![
            event("binary_sensor.door", "on", 0),
            event("binary_sensor.motion", "off", 0),
        ]);
        let table = Detective::new(&history)
            .fetch_by_list(&ids(&["binary_sensor.door", "binary_sensor.motion"]))
            .unwrap();
        assert_eq!(table.rows(), &[vec![1.0, 0.0]]);
    }

    #[test]
    fn catalog_groups_known_entities() {
        let history = InMemoryHistory::new(vec![
            event("light.kitchen", "on", 0),
            event("switch.ac", "off", 0),
            event("light.living_room", "on", 0),
        ]);
        let catalog = Detective::new(&history).catalog().unwrap();
        assert_eq!(catalog.entity_count(), 3);
        assert_eq!(catalog.entities("light").len(), 2);
    }

    #[test]
    fn describe_uses_latest_attributes() {
        let history = InMemoryHistory::new(vec![
            event("sensor.temp", "20", 0).with_attributes(Some(json!({"friendly_name": "Old"}))),
            event("sensor.temp", "21", 60).with_attributes(Some(json!({
                "friendly_name": "Temperature",
                "unit_of_measurement": "°C",
            }))),
        ]);
        let described = Detective::new(&history)
            .describe_entities(Some("sensor"))
            .unwrap();
        assert_eq!(described.len(), 1);
        assert_eq!(described[0].friendly_name, "Temperature");
        assert_eq!(described[0].unit_of_measurement, "°C");
    }

    #[test]
    fn limit_is_forwarded_to_the_history() {
        let history = InMemoryHistory::new(vec![
            event("sensor.a", "1", 0),
            event("sensor.a", "2", 60),
            event("sensor.a", "3", 120),
        ]);
        let series = Detective::new(&history)
            .with_limit(Some(2))
            .single_entity_series("sensor.a")
            .unwrap();
        assert_eq!(series.values().collect::<Vec<_>>(), vec![2.0, 3.0]);
    }

    #[test]
    fn empty_series_is_a_data_shape_error() {
        let history = InMemoryHistory::new(vec![event("sensor.a", "text", 0)]);
        let err = Detective::new(&history)
            .single_entity_series("sensor.a")
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::DataShape(DataShapeError::Empty { .. })
        ));
    }
}
