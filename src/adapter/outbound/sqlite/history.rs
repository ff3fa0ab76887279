//! SQLite implementation of the [`StateHistory`] port.
//!
//! All query text for the recorder schema lives here.

use std::path::Path;

use diesel::prelude::*;
use tracing::debug;

use super::database::connection::{create_pool, DbPool};
use super::database::model::{EntityCountRow, StateRow};
use super::database::schema::{state_attributes, states, states_meta};
use crate::adapter::outbound::hass::url::DatabaseUrl;
use crate::domain::{RawEvent, SENTINEL_STATES};
use crate::error::{Error, Result};
use crate::port::outbound::history::{EntitySelection, StateHistory, StateQuery};

const ENTITY_COUNTS_SQL: &str = "\
    SELECT states_meta.entity_id AS entity_id, COUNT(*) AS row_count \
    FROM states \
    INNER JOIN states_meta ON states.metadata_id = states_meta.metadata_id \
    WHERE states_meta.entity_id IS NOT NULL \
    GROUP BY states_meta.entity_id \
    ORDER BY row_count DESC, entity_id ASC";

/// Recorder history read from a SQLite database.
pub struct SqliteStateHistory {
    pool: DbPool,
}

impl SqliteStateHistory {
    /// Wrap an existing pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open the database a URL points at.
    ///
    /// # Errors
    /// Returns a config error for non-SQLite URLs and a connection error
    /// when the database file does not exist.
    pub fn connect(url: &DatabaseUrl) -> Result<Self> {
        let path = url.sqlite_path()?;
        if !url.is_memory() && !Path::new(path).is_file() {
            return Err(Error::Connection(format!("database file {path} does not exist")));
        }
        debug!(database = %url, "opening recorder database");
        Ok(Self::new(create_pool(path)?))
    }

    fn conn(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>>
    {
        self.pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))
    }
}

/// Escape `LIKE` wildcards so a domain matches literally.
fn domain_pattern(domain: &str) -> String {
    let mut pattern = String::with_capacity(domain.len() + 2);
    for c in domain.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push_str(".%");
    pattern
}

impl StateHistory for SqliteStateHistory {
    fn entity_ids(&self) -> Result<Vec<String>> {
        let mut conn = self.conn()?;
        let rows: Vec<EntityCountRow> = diesel::sql_query(ENTITY_COUNTS_SQL).load(&mut conn)?;
        debug!(entities = rows.len(), "loaded entity ids");
        Ok(rows.into_iter().map(|row| row.entity_id).collect())
    }

    fn fetch_states(&self, query: &StateQuery) -> Result<Vec<RawEvent>> {
        let mut conn = self.conn()?;

        let mut statement = states::table
            .inner_join(states_meta::table)
            .left_join(state_attributes::table)
            .filter(states::state.is_not_null())
            .filter(states::state.ne_all(SENTINEL_STATES))
            .filter(states::last_updated_ts.is_not_null())
            .select((
                states_meta::entity_id,
                states::state,
                states::last_updated_ts,
                state_attributes::shared_attrs.nullable(),
            ))
            .order(states::last_updated_ts.desc())
            .into_boxed();

        match &query.selection {
            EntitySelection::All => {}
            EntitySelection::Domain(domain) => {
                statement = statement.filter(
                    states_meta::entity_id
                        .like(domain_pattern(domain))
                        .escape('\\'),
                );
            }
            EntitySelection::Entities(entities) => {
                statement = statement.filter(states_meta::entity_id.eq_any(entities.clone()));
            }
        }
        if let Some(limit) = query.limit {
            statement = statement.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows: Vec<StateRow> = statement.load(&mut conn)?;
        let fetched = rows.len();
        let events: Vec<RawEvent> = rows.into_iter().filter_map(StateRow::into_event).collect();
        debug!(
            fetched,
            kept = events.len(),
            limit = ?query.limit,
            "loaded states"
        );
        Ok(events)
    }
}
