//! Temporary recorder databases with the Home Assistant schema.
//!
//! Only the tables and columns the history adapter reads are created,
//! plus a few of the unused columns so the layout resembles a real
//! `home-assistant_v2.db`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use diesel::prelude::*;
use diesel::sql_types::{Double, Integer, Nullable, Text};

use crate::adapter::outbound::hass::DatabaseUrl;
use crate::domain::RawEvent;
use crate::error::{Error, Result};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE states_meta (
        metadata_id INTEGER PRIMARY KEY,
        entity_id VARCHAR(255)
    )",
    "CREATE TABLE state_attributes (
        attributes_id INTEGER PRIMARY KEY,
        hash BIGINT,
        shared_attrs TEXT
    )",
    "CREATE TABLE states (
        state_id INTEGER PRIMARY KEY,
        entity_id CHAR(0),
        state VARCHAR(255),
        attributes CHAR(0),
        last_changed_ts FLOAT,
        last_updated_ts FLOAT,
        old_state_id INTEGER,
        attributes_id INTEGER REFERENCES state_attributes(attributes_id),
        origin_idx SMALLINT,
        metadata_id INTEGER REFERENCES states_meta(metadata_id)
    )",
];

/// A writable recorder database file for tests.
pub struct Recorder {
    path: PathBuf,
    conn: SqliteConnection,
    metadata_ids: HashMap<String, i32>,
    next_attributes_id: i32,
}

impl Recorder {
    /// Create the schema in a new database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or the schema fails.
    pub fn create(path: &Path) -> Result<Self> {
        let mut conn = SqliteConnection::establish(&path.display().to_string())
            .map_err(|e| Error::Connection(e.to_string()))?;
        for statement in SCHEMA {
            diesel::sql_query(statement).execute(&mut conn)?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            conn,
            metadata_ids: HashMap::new(),
            next_attributes_id: 1,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `sqlite:////...` URL of the file.
    #[must_use]
    pub fn url(&self) -> DatabaseUrl {
        DatabaseUrl::sqlite_file(&self.path)
    }

    fn metadata_id(&mut self, entity: &str) -> Result<i32> {
        if let Some(id) = self.metadata_ids.get(entity) {
            return Ok(*id);
        }
        let id = i32::try_from(self.metadata_ids.len() + 1).unwrap_or(i32::MAX);
        diesel::sql_query("INSERT INTO states_meta (metadata_id, entity_id) VALUES (?, ?)")
            .bind::<Integer, _>(id)
            .bind::<Text, _>(entity)
            .execute(&mut self.conn)?;
        self.metadata_ids.insert(entity.to_string(), id);
        Ok(id)
    }

    /// Insert one state row.
    ///
    /// # Errors
    /// Returns an error if an insert fails.
    pub fn insert_state(
        &mut self,
        entity: &str,
        state: Option<&str>,
        last_updated_ts: Option<f64>,
        shared_attrs: Option<&str>,
    ) -> Result<()> {
        let metadata_id = self.metadata_id(entity)?;
        let attributes_id = match shared_attrs {
            Some(attrs) => {
                let id = self.next_attributes_id;
                self.next_attributes_id += 1;
                diesel::sql_query(
                    "INSERT INTO state_attributes (attributes_id, hash, shared_attrs) VALUES (?, 0, ?)",
                )
                .bind::<Integer, _>(id)
                .bind::<Text, _>(attrs)
                .execute(&mut self.conn)?;
                Some(id)
            }
            None => None,
        };

        diesel::sql_query(
            "INSERT INTO states (state, last_changed_ts, last_updated_ts, attributes_id, metadata_id) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind::<Nullable<Text>, _>(state)
        .bind::<Nullable<Double>, _>(last_updated_ts)
        .bind::<Nullable<Double>, _>(last_updated_ts)
        .bind::<Nullable<Integer>, _>(attributes_id)
        .bind::<Integer, _>(metadata_id)
        .execute(&mut self.conn)?;
        Ok(())
    }

    /// Insert every event, serializing attributes to JSON.
    ///
    /// # Errors
    /// Returns an error if an insert fails.
    pub fn insert_events(&mut self, events: &[RawEvent]) -> Result<()> {
        for event in events {
            let attrs = event.attributes.as_ref().map(ToString::to_string);
            let ts = event.timestamp.timestamp_micros() as f64 / 1_000_000.0;
            self.insert_state(&event.entity, event.state.as_deref(), Some(ts), attrs.as_deref())?;
        }
        Ok(())
    }
}
