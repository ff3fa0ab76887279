//! End-to-end analysis over a seeded recorder database.

mod support;

use approx::assert_relative_eq;
use hass_detective::adapter::outbound::forecast::HoltWintersForecaster;
use hass_detective::adapter::outbound::sqlite::SqliteStateHistory;
use hass_detective::application::Detective;
use hass_detective::domain::{Frequency, PairMode};
use hass_detective::error::{DataShapeError, Error, UsageError};
use hass_detective::testkit::domain::{at, ids};
use support::House;

fn detective(house: &House) -> Detective<SqliteStateHistory> {
    Detective::new(SqliteStateHistory::connect(&house.recorder.url()).expect("connect"))
}

#[test]
fn catalog_groups_entities_by_first_seen_domain() {
    let house = House::new();
    let catalog = detective(&house).catalog().unwrap();

    let domains: Vec<&str> = catalog.domains().collect();
    assert_eq!(domains, vec!["sensor", "binary_sensor", "light", "sensorx"]);
    assert_eq!(
        catalog.entities("sensor"),
        ids(&[
            "sensor.temperature",
            "sensor.humidity",
            "sensor.power",
            "sensor.status"
        ])
        .as_slice()
    );
    assert_eq!(catalog.entity_count(), 8);
}

#[test]
fn entity_attributes_come_from_the_latest_state() {
    let house = House::new();
    let described = detective(&house).describe_entities(Some("sensor")).unwrap();

    let temperature = described
        .iter()
        .find(|a| a.entity == "sensor.temperature")
        .unwrap();
    assert_eq!(temperature.friendly_name, "Living room");
    assert_eq!(temperature.unit_of_measurement, "°C");

    let power = described.iter().find(|a| a.entity == "sensor.power").unwrap();
    assert_eq!(power.friendly_name, "sensor.power");
    assert_eq!(power.device_class, "");
}

#[test]
fn numeric_sensors_are_aligned_and_complete() {
    let house = House::new();
    let table = detective(&house).numeric_sensors().unwrap();

    assert_eq!(
        table.columns(),
        ids(&["sensor.humidity", "sensor.power", "sensor.temperature"]).as_slice()
    );
    assert_eq!(table.len(), 20);
    assert_eq!(table.missing_cells(), 0);
    assert_eq!(table.index()[0], at(30).naive_utc());
    assert_eq!(table.rows().last().unwrap(), &vec![49.0, 100.0, 29.5]);
}

#[test]
fn binary_sensors_keep_gaps() {
    let house = House::new();
    let table = detective(&house).binary_sensors().unwrap();

    assert_eq!(
        table.columns(),
        ids(&["binary_sensor.door", "binary_sensor.motion"]).as_slice()
    );
    assert_eq!(table.len(), 6);
    assert!(table.rows()[0][0].is_nan());
    assert_eq!(table.rows()[0][1], 1.0);
}

#[test]
fn fetch_by_list_selects_requested_entities() {
    let house = House::new();
    let table = detective(&house)
        .fetch_by_list(&ids(&["sensor.temperature", "sensor.humidity"]))
        .unwrap();

    assert_eq!(
        table.columns(),
        ids(&["sensor.humidity", "sensor.temperature"]).as_slice()
    );
    assert_eq!(table.len(), 11);
}

#[test]
fn fetch_by_list_rejects_mixed_domains() {
    let house = House::new();
    let err = detective(&house)
        .fetch_by_list(&ids(&["sensor.temperature", "light.kitchen"]))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Usage(UsageError::MixedDomains { ref domains }) if domains == &ids(&["sensor", "light"])
    ));
}

#[test]
fn entities_without_numeric_history_are_reported() {
    let house = House::new();
    let err = detective(&house)
        .fetch_by_list(&ids(&["sensor.temperature", "sensor.status"]))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::DataShape(DataShapeError::UnknownEntities { ref entities })
            if entities == &ids(&["sensor.status"])
    ));
}

#[test]
fn correlations_rank_strongest_positive_first() {
    let house = House::new();
    let records = detective(&house).sensor_correlations().unwrap();

    assert_eq!(records.len(), 3);
    assert!(records.windows(2).all(|w| w[0].coefficient >= w[1].coefficient));
    let last = records.last().unwrap();
    assert_eq!(last.pair, "sensor.humidity-sensor.temperature");
    assert!(last.coefficient < -0.9);
}

#[test]
fn ordered_mode_keeps_both_directions() {
    let house = House::new();
    let records = detective(&house)
        .with_pair_mode(PairMode::Ordered)
        .sensor_correlations()
        .unwrap();

    assert_eq!(records.len(), 6);
    let forward = records
        .iter()
        .find(|r| r.pair == "sensor.humidity-sensor.temperature")
        .unwrap();
    let backward = records
        .iter()
        .find(|r| r.pair == "sensor.temperature-sensor.humidity")
        .unwrap();
    assert_relative_eq!(forward.coefficient, backward.coefficient);
}

#[test]
fn row_limit_reaches_the_database() {
    let house = House::new();
    let table = detective(&house)
        .with_limit(Some(4))
        .fetch_by_list(&ids(&["sensor.temperature", "sensor.humidity"]))
        .unwrap();

    // The newest four rows span 480..600 and the 480 row is incomplete.
    assert_eq!(table.len(), 2);
}

#[test]
fn forecast_extends_a_sensor() {
    let house = House::new();
    let table = detective(&house)
        .forecast(
            &HoltWintersForecaster::default(),
            "sensor.temperature",
            3,
            Frequency::minutes(1),
        )
        .unwrap();

    assert_eq!(table.entity, "sensor.temperature");
    assert_eq!(table.fitted().count(), 11);
    let predicted: Vec<_> = table.predictions().collect();
    assert_eq!(predicted.len(), 3);
    assert_eq!(predicted[0].timestamp, at(660).naive_utc());
    assert!(predicted[0].yhat > 25.0);
}

#[test]
fn unknown_entity_has_no_series() {
    let house = House::new();
    let err = detective(&house)
        .single_entity_series("sensor.nowhere")
        .unwrap_err();
    assert!(matches!(err, Error::DataShape(DataShapeError::Empty { .. })));
}
