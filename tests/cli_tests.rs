//! Command-line behaviour of the `hass-detective` binary.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use support::{write, House, AUTH_STORE};
use tempfile::TempDir;

/// Command isolated from the user's config file and environment.
fn detective(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hass-detective").expect("binary");
    cmd.env_remove("HASS_DETECTIVE_DB_URL")
        .env_remove("RUST_LOG")
        .env_remove("HASSIO_TOKEN")
        .env("HOME", config_dir.path())
        .arg("--color")
        .arg("never")
        .arg("--config")
        .arg(config_dir.path().join("config.toml"));
    cmd
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("json output")
}

#[test]
fn db_url_prints_the_explicit_url() {
    let home = TempDir::new().unwrap();
    detective(&home)
        .args(["--quiet", "db-url", "--db-url", "mysql://hass:pw@db/hass"])
        .assert()
        .success()
        .stdout("mysql://hass:***@db/hass\n");
}

#[test]
fn db_url_comes_from_the_environment() {
    let home = TempDir::new().unwrap();
    detective(&home)
        .env("HASS_DETECTIVE_DB_URL", "sqlite:////tmp/env.db")
        .args(["--json", "db-url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"url\":\"sqlite:////tmp/env.db\""));
}

#[test]
fn db_url_is_discovered_from_hass_config() {
    let home = TempDir::new().unwrap();
    let hass = TempDir::new().unwrap();
    write(
        hass.path(),
        "configuration.yaml",
        "recorder:\n  db_url: !secret db\n",
    );
    write(hass.path(), "secrets.yaml", "db: sqlite:////data/recorder.db\n");

    detective(&home)
        .args(["--quiet", "db-url", "--hass-config"])
        .arg(hass.path())
        .assert()
        .success()
        .stdout("sqlite:////data/recorder.db\n");
}

#[test]
fn entities_are_listed_as_json() {
    let home = TempDir::new().unwrap();
    let house = House::new();
    let output = detective(&home)
        .args(["--json", "entities", "--db-url", &house.db_url()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let doc = json_stdout(&output);
    assert_eq!(doc["command"], "entities");
    assert_eq!(doc["domains"]["binary_sensor"][0], "binary_sensor.motion");
    assert_eq!(doc["domains"]["light"][0], "light.kitchen");
}

#[test]
fn sensors_csv_has_a_timestamp_header() {
    let home = TempDir::new().unwrap();
    let house = House::new();
    detective(&home)
        .args(["sensors", "--csv", "--db-url", &house.db_url()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "timestamp,sensor.humidity,sensor.power,sensor.temperature\n",
        ));
}

#[test]
fn fetch_rejects_mixed_domains_before_querying() {
    let home = TempDir::new().unwrap();
    detective(&home)
        .args([
            "fetch",
            "sensor.temperature",
            "light.kitchen",
            "--db-url",
            "sqlite:////definitely/missing.db",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hass_detective::usage"))
        .stderr(predicate::str::contains("same domain"));
}

#[test]
fn fetch_single_entity_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    let house = House::new();
    detective(&home)
        .args(["fetch", "sensor.temperature", "--db-url", &house.db_url()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hass_detective::usage"))
        .stderr(predicate::str::contains("must pass more than 1 entity"));
}

#[test]
fn correlations_respect_top_and_ordering() {
    let home = TempDir::new().unwrap();
    let house = House::new();
    let output = detective(&home)
        .args([
            "--json",
            "correlations",
            "--ordered",
            "--top",
            "4",
            "--db-url",
            &house.db_url(),
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let doc = json_stdout(&output);
    assert_eq!(doc["pair_mode"], "ordered");
    assert_eq!(doc["correlations"].as_array().unwrap().len(), 4);
}

#[test]
fn forecast_csv_lists_predictions() {
    let home = TempDir::new().unwrap();
    let house = House::new();
    let output = detective(&home)
        .args([
            "forecast",
            "sensor.temperature",
            "--periods",
            "2",
            "--freq",
            "1min",
            "--csv",
            "--db-url",
            &house.db_url(),
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("timestamp,yhat,kind\n"));
    assert_eq!(stdout.matches(",predicted").count(), 2);
    assert_eq!(stdout.matches(",fitted").count(), 11);
}

#[test]
fn timeline_reports_on_share() {
    let home = TempDir::new().unwrap();
    let house = House::new();
    let output = detective(&home)
        .args([
            "--json",
            "timeline",
            "binary_sensor.motion",
            "--freq",
            "1min",
            "--db-url",
            &house.db_url(),
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let doc = json_stdout(&output);
    assert_eq!(doc["entity"], "binary_sensor.motion");
    assert_eq!(doc["series"].as_array().unwrap().len(), 9);
}

#[test]
fn plot_draws_a_sparkline() {
    let home = TempDir::new().unwrap();
    let house = House::new();
    detective(&home)
        .args(["plot", "sensor.temperature", "--db-url", &house.db_url()])
        .assert()
        .success()
        .stdout(predicate::str::contains("sensor.temperature"))
        .stdout(predicate::str::contains("▁"))
        .stdout(predicate::str::contains("█"));
}

#[test]
fn plot_aligns_several_entities() {
    let home = TempDir::new().unwrap();
    let house = House::new();
    let output = detective(&home)
        .args([
            "--json",
            "plot",
            "sensor.temperature",
            "sensor.humidity",
            "--db-url",
            &house.db_url(),
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let doc = json_stdout(&output);
    let series = doc["series"].as_array().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0]["entity"], "sensor.temperature");
    assert_eq!(
        series[0]["points"].as_array().unwrap().len(),
        series[1]["points"].as_array().unwrap().len()
    );
}

#[test]
fn plot_reports_unknown_entities() {
    let home = TempDir::new().unwrap();
    let house = House::new();
    detective(&home)
        .args([
            "plot",
            "sensor.temperature",
            "sensor.nowhere",
            "--db-url",
            &house.db_url(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hass_detective::data"))
        .stderr(predicate::str::contains("sensor.nowhere"));
}

#[test]
fn users_are_read_from_the_auth_store() {
    let home = TempDir::new().unwrap();
    let hass = TempDir::new().unwrap();
    write(hass.path(), ".storage/auth", AUTH_STORE);

    let output = detective(&home)
        .args(["--json", "users", "--hass-config"])
        .arg(hass.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let doc = json_stdout(&output);
    assert_eq!(doc["users"].as_array().unwrap().len(), 2);
    assert_eq!(doc["refresh_tokens"][0]["user"]["name"], "Ada");
}

#[test]
fn missing_database_is_a_database_error() {
    let home = TempDir::new().unwrap();
    detective(&home)
        .args(["sensors", "--db-url", "sqlite:////definitely/missing.db"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hass_detective::database"));
}

#[test]
fn non_sqlite_databases_are_rejected() {
    let home = TempDir::new().unwrap();
    detective(&home)
        .args(["sensors", "--db-url", "postgresql://db/hass"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hass_detective::config"))
        .stderr(predicate::str::contains("postgresql"));
}

#[test]
fn invalid_config_file_fails() {
    let home = TempDir::new().unwrap();
    write(home.path(), "config.toml", "[database]\nlimit = 0\n");

    detective(&home)
        .args(["sensors", "--db-url", "sqlite:///x.db"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("database.limit"));
}
