//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use hass_detective::domain::RawEvent;
use hass_detective::testkit::domain::event;
use hass_detective::testkit::recorder::Recorder;
use serde_json::json;
use tempfile::TempDir;

pub const TEMPERATURE: [f64; 10] = [20.0, 21.0, 22.0, 23.0, 24.0, 25.0, 26.0, 27.0, 28.0, 29.0];
pub const HUMIDITY: [f64; 10] = [60.0, 59.0, 57.0, 57.0, 55.0, 54.0, 52.0, 52.0, 50.0, 49.0];
pub const POWER: [f64; 10] = [100.0, 80.0, 120.0, 90.0, 110.0, 95.0, 105.0, 85.0, 115.0, 100.0];

/// A small house: three numeric sensors sampled every minute, a text
/// sensor, two binary sensors, a light and an entity whose domain only
/// shares a prefix with `sensor`.
pub fn house_events() -> Vec<RawEvent> {
    let mut events = Vec::new();
    for minute in 0..10 {
        let secs = minute * 60;
        let i = minute as usize;
        events.push(event("sensor.temperature", &TEMPERATURE[i].to_string(), secs));
        events.push(event("sensor.humidity", &HUMIDITY[i].to_string(), secs));
        events.push(event("sensor.power", &POWER[i].to_string(), secs + 30));
    }
    events.push(
        event("sensor.temperature", "29.5", 600).with_attributes(Some(json!({
            "friendly_name": "Living room",
            "unit_of_measurement": "°C",
            "device_class": "temperature",
        }))),
    );
    events.push(event("sensor.temperature", "unavailable", 630));
    events.push(event("sensor.status", "ok", 0));

    events.push(event("binary_sensor.motion", "on", 0));
    events.push(event("binary_sensor.motion", "off", 120));
    events.push(event("binary_sensor.motion", "on", 300));
    events.push(event("binary_sensor.motion", "off", 480));
    events.push(event("binary_sensor.door", "off", 60));
    events.push(event("binary_sensor.door", "on", 240));

    events.push(event("light.kitchen", "on", 0));
    events.push(event("light.kitchen", "off", 300));

    events.push(event("sensorx.fake", "1", 0));
    events
}

/// Recorder database holding [`house_events`] plus a row without a
/// timestamp.
pub struct House {
    pub dir: TempDir,
    pub recorder: Recorder,
}

impl House {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let mut recorder =
            Recorder::create(&dir.path().join("home-assistant_v2.db")).expect("recorder");
        recorder
            .insert_events(&house_events())
            .expect("seed recorder");
        recorder
            .insert_state("sensor.temperature", Some("99"), None, None)
            .expect("seed untimed row");
        Self { dir, recorder }
    }

    pub fn db_path(&self) -> &Path {
        self.recorder.path()
    }

    pub fn db_url(&self) -> String {
        self.recorder.url().as_str().to_string()
    }
}

/// Write a file under `dir`, creating parent directories.
pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(&path, content).expect("write fixture");
    path
}

pub const AUTH_STORE: &str = r#"{
    "version": 1,
    "key": "auth",
    "data": {
        "users": [
            {"id": "u1", "name": "Ada", "is_owner": true, "is_active": true, "system_generated": false},
            {"id": "u2", "name": "Supervisor", "is_owner": false, "is_active": true, "system_generated": true}
        ],
        "refresh_tokens": [
            {"id": "t1", "user_id": "u1", "client_id": "https://home.example/", "client_name": null},
            {"id": "t2", "user_id": "u2", "client_id": null, "client_name": "Supervisor"}
        ]
    }
}"#;
