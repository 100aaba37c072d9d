mod connection;
pub use self::connection::{DBOptions, IN_MEMORY_DB};
pub mod db_migration;
// Database schema - must be kept up to date manually
mod entity;
pub use self::entity::*;
mod errors;
pub use self::errors::*;
pub mod path_repository;
pub use self::path_repository::PathFilter;
mod queries;
pub use self::queries::HistoryQuery;
pub mod records;
pub use self::records::{PagedQuery, Records};
mod schema;
pub mod version_repository;
pub use self::version_repository::VersionFilter;

use diesel::connection::SimpleConnection;
use log::{debug, info, warn};

use self::connection::{ConnectionPool, PooledConnection};

/// Handle to one history database.
///
/// All state lives in the database itself, the handle only owns a connection pool.
/// Clones share that pool and can be moved freely between threads, every operation checks
/// out one connection for its duration.
#[derive(Clone)]
pub struct HistoryDB {
    pool: ConnectionPool,
    options: DBOptions,
}

impl HistoryDB {
    /// Opens (or creates) the database file at the given path using default options.
    /// Use IN_MEMORY_DB for a throw away database.
    ///
    /// Does not touch the schema, call setup() before recording anything.
    pub fn open(db_path: &str) -> Result<HistoryDB> {
        Self::open_with_options(db_path, &DBOptions::default())
    }

    pub fn open_with_options(db_path: &str, options: &DBOptions) -> Result<HistoryDB> {
        let pool = connection::build_pool(db_path, options)?;

        Ok(HistoryDB {
            pool,
            options: options.clone(),
        })
    }

    /// Releases this handle's share of the connection pool.
    /// Connections close once the last clone of the handle is gone.
    pub fn close(self) {}

    pub fn options(&self) -> &DBOptions {
        &self.options
    }

    /// Creates the path and version relations if they do not exist (idempotent).
    pub fn setup(&self) -> Result<()> {
        let conn = self.connection()?;
        let version = conn.immediate_transaction(|| db_migration::upgrade_db(&conn))?;
        info!("History database schema is at version {}", version);

        Ok(())
    }

    /// Drops both relations including every recorded path and version.
    pub fn drop_all(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.immediate_transaction(|| db_migration::drop_db(&conn))?;
        info!("Dropped all history relations");

        Ok(())
    }

    /// Registers a new path without any versions.
    /// Fails with a ConstraintViolation if the path is already tracked.
    pub fn add_path(&self, location: &str, name: &str) -> Result<TrackedPath> {
        let conn = self.connection()?;
        let path = conn.immediate_transaction(|| path_repository::create(&conn, location, name))?;
        debug!("Added path '{}' (id {})", path, path.id);

        Ok(path)
    }

    pub fn find_path(&self, location: &str, name: &str) -> Result<Option<TrackedPath>> {
        let conn = self.connection()?;
        path_repository::find_one(&conn, location, name)
    }

    /// Purges a path together with its complete history.
    pub fn delete_path(&self, path_id: i64) -> Result<()> {
        let conn = self.connection()?;
        conn.immediate_transaction(|| path_repository::delete(&conn, path_id))?;
        debug!("Purged path with id {}", path_id);

        Ok(())
    }

    /// Appends a version with an explicit number to an existing path.
    ///
    /// The number must be the next one in the path's sequence: existing numbers are
    /// reported as ConstraintViolation, numbers that would leave a gap (or are < 1) as
    /// ViolatesDBConsistency. Fails with NotFound if no path with the given id exists.
    pub fn add_version(&self, path_id: i64, version_no: i64, attrs: &Attributes) -> Result<Version> {
        if version_no < 1 {
            return Err(HistoryDBError::ViolatesDBConsistency {
                message: "Version numbers start at 1!",
            });
        }

        let conn = self.connection()?;
        let version = conn.immediate_transaction(|| {
            if path_repository::find_by_id(&conn, path_id)?.is_none() {
                return Err(HistoryDBError::NotFound);
            }

            let next_version_no = version_repository::max_version_no(&conn, path_id)?.unwrap_or(0) + 1;
            if version_no > next_version_no {
                return Err(HistoryDBError::ViolatesDBConsistency {
                    message: "Version numbers of a path must not contain gaps!",
                });
            }

            version_repository::create(&conn, path_id, version_no, attrs)
        })?;
        debug!("Added version {} to path id {}", version_no, path_id);

        Ok(version)
    }

    pub fn max_version_no(&self, path_id: i64) -> Result<Option<i64>> {
        let conn = self.connection()?;
        version_repository::max_version_no(&conn, path_id)
    }

    /// Records a new observation of the entry (location, name).
    ///
    /// Unknown entries are registered and receive version 1, known ones receive the
    /// version following their current highest one. Lookup, numbering and insertion run in
    /// a single IMMEDIATE transaction, which holds SQLite's write lock from the first read
    /// on. Concurrent upserts therefore queue up (bounded by the busy timeout) instead of
    /// computing the same number. Should a conflict still reach the database, the primary key
    /// on (path_id, version_no) rejects it, everything is rolled back and the caller receives
    /// a ConstraintViolation (see retry_on_conflict).
    pub fn upsert_version(
        &self,
        location: &str,
        name: &str,
        attrs: &Attributes,
    ) -> Result<(TrackedPath, Version)> {
        let conn = self.connection()?;
        let (path, version) = conn.immediate_transaction::<_, HistoryDBError, _>(|| {
            let (path, next_version_no) = match path_repository::find_one(&conn, location, name)? {
                Some(path) => {
                    let max_version_no = version_repository::max_version_no(&conn, path.id)?;
                    (path, max_version_no.unwrap_or(0) + 1)
                }
                None => (path_repository::create(&conn, location, name)?, 1),
            };

            let version = version_repository::create(&conn, path.id, next_version_no, attrs)?;
            Ok((path, version))
        })?;
        debug!("Recorded version {} of '{}'", version.version_no, path);

        Ok((path, version))
    }

    /// Lazily lists all paths matching the filter, ordered by id.
    pub fn list_paths(&self, filter: PathFilter) -> Records<PathFilter> {
        Records::new(self.pool.clone(), filter, self.options.page_size)
    }

    /// Lazily lists all versions matching the filter, ordered by path and version number.
    pub fn list_versions(&self, filter: VersionFilter) -> Records<VersionFilter> {
        Records::new(self.pool.clone(), filter, self.options.page_size)
    }

    /// Lazily lists the joined history of all paths matching the filter,
    /// ordered by path and version number.
    pub fn list_history(&self, filter: PathFilter) -> Records<HistoryQuery> {
        Records::new(
            self.pool.clone(),
            HistoryQuery::new(filter),
            self.options.page_size,
        )
    }

    /// Rebuilds the database file, can save space after purging paths.
    pub fn optimize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.batch_execute("VACUUM")?;

        Ok(())
    }

    fn connection(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }
}

/// Runs the operation until it succeeds, fails with anything but a ConstraintViolation, or
/// max_attempts are used up.
///
/// The HistoryDB never retries on its own. Callers racing on the same path (e.g. two
/// observers of one directory) can opt in with this helper, each attempt re-reads the
/// current state of the database.
pub fn retry_on_conflict<T, F>(max_attempts: usize, mut operation: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut attempt = 1;
    loop {
        match operation() {
            Err(HistoryDBError::ConstraintViolation { .. }) if attempt < max_attempts => {
                warn!(
                    "Conflicting write (attempt {} of {}), retrying",
                    attempt, max_attempts
                );
                attempt += 1;
            }
            result => return result,
        }
    }
}
