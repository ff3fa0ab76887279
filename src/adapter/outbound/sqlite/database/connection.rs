//! Database connection management using Diesel ORM.
//!
//! Pools are read-only: every pooled connection is switched to
//! `query_only` so the recorder database is never written.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;

use crate::error::{Error, Result};

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Milliseconds SQLite waits on a locked database before failing.
pub const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Applies the read-side pragmas to every new pooled connection.
#[derive(Debug, Clone, Copy)]
struct ReadOnlyPragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ReadOnlyPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        configure_sqlite_connection(conn).map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Set the busy timeout and forbid writes on a connection.
///
/// # Errors
/// Returns an error if a pragma fails to apply.
pub fn configure_sqlite_connection(conn: &mut SqliteConnection) -> QueryResult<()> {
    diesel::sql_query(format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}")).execute(conn)?;
    diesel::sql_query("PRAGMA query_only = ON").execute(conn)?;
    Ok(())
}

/// Create a read-only connection pool for a SQLite file path.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool(database: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database);
    Pool::builder()
        .max_size(2)
        .connection_customizer(Box::new(ReadOnlyPragmas))
        .build(manager)
        .map_err(|e| Error::Connection(e.to_string()))
}
