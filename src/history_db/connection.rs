use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::time::Duration;

use super::Result;

pub type ConnectionPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type PooledConnection = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

/// Special database path that keeps all data in memory (lost when the HistoryDB is closed).
pub const IN_MEMORY_DB: &str = ":memory:";

/// Tuning knobs of an opened HistoryDB.
#[derive(Debug, Clone)]
pub struct DBOptions {
    /// Upper bound of concurrently open connections (ignored for in memory databases).
    pub max_connections: u32,
    /// How long a write waits for SQLite's write lock before giving up.
    pub busy_timeout: Duration,
    /// How long an operation waits for a free pooled connection.
    pub connection_timeout: Duration,
    /// Number of rows fetched per round trip when iterating query results.
    pub page_size: i64,
}

impl Default for DBOptions {
    fn default() -> Self {
        DBOptions {
            max_connections: 8,
            busy_timeout: Duration::from_secs(5),
            connection_timeout: Duration::from_secs(30),
            page_size: 256,
        }
    }
}

#[derive(Debug)]
struct ConnectionSettings {
    busy_timeout: Duration,
}

impl r2d2::CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionSettings {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        apply_connection_settings(conn, self.busy_timeout).map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the connection pool used by a HistoryDB.
///
/// File databases are switched to WAL mode once, so readers never block the writer.
/// Each connection to ':memory:' is its own database, thus in memory databases are
/// pinned to exactly one connection that is never recycled.
pub fn build_pool(db_path: &str, options: &DBOptions) -> Result<ConnectionPool> {
    let in_memory = db_path == IN_MEMORY_DB;
    if !in_memory {
        prepare_db_file(db_path, options.busy_timeout)?;
    }

    let builder = r2d2::Pool::builder()
        .connection_timeout(options.connection_timeout)
        .connection_customizer(Box::new(ConnectionSettings {
            busy_timeout: options.busy_timeout,
        }));
    let builder = if in_memory {
        builder
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        builder.max_size(options.max_connections.max(1))
    };

    debug!("Opening connection pool for history database '{}'", db_path);
    let pool = builder.build(ConnectionManager::<SqliteConnection>::new(db_path))?;

    Ok(pool)
}

fn prepare_db_file(db_path: &str, busy_timeout: Duration) -> Result<()> {
    let conn = SqliteConnection::establish(db_path)?;
    apply_connection_settings(&conn, busy_timeout)?;
    conn.batch_execute("PRAGMA journal_mode = WAL")?;

    Ok(())
}

// Both settings are per connection and must be re-applied to every new one.
fn apply_connection_settings(conn: &SqliteConnection, busy_timeout: Duration) -> QueryResult<()> {
    conn.batch_execute(&format!(
        "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON;",
        busy_timeout.as_millis()
    ))
}
