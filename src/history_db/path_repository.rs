use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::entity::tracked_path;
use super::records::PagedQuery;
use super::schema::paths;
use super::{HistoryDBError, Result, TrackedPath};

/// Optional exact-match filters on paths, combined with AND.
/// The default filter matches every path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathFilter {
    pub location: Option<String>,
    pub name: Option<String>,
}

impl PathFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_location<S: Into<String>>(mut self, location: S) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Inserts a new path. Fails with a ConstraintViolation if (location, name) is already known.
pub fn create(conn: &SqliteConnection, location: &str, name: &str) -> Result<TrackedPath> {
    diesel::insert_into(paths::table)
        .values(tracked_path::InsertFull { location, name })
        .execute(conn)?;

    let result = paths::table
        .filter(paths::location.eq(location))
        .filter(paths::name.eq(name))
        .first::<TrackedPath>(conn)?;
    Ok(result)
}

pub fn find_one(conn: &SqliteConnection, location: &str, name: &str) -> Result<Option<TrackedPath>> {
    let result = paths::table
        .filter(paths::location.eq(location))
        .filter(paths::name.eq(name))
        .first::<TrackedPath>(conn)
        .optional()?;
    Ok(result)
}

pub fn find_by_id(conn: &SqliteConnection, id: i64) -> Result<Option<TrackedPath>> {
    let result = paths::table.find(id).first::<TrackedPath>(conn).optional()?;
    Ok(result)
}

/// Lists at most limit paths matching the filter, ordered by id and starting after after_id.
pub fn find(
    conn: &SqliteConnection,
    filter: &PathFilter,
    after_id: Option<i64>,
    limit: i64,
) -> Result<Vec<TrackedPath>> {
    let mut query = paths::table.into_boxed();
    if let Some(ref location) = filter.location {
        query = query.filter(paths::location.eq(location.as_str()));
    }
    if let Some(ref name) = filter.name {
        query = query.filter(paths::name.eq(name.as_str()));
    }
    if let Some(after_id) = after_id {
        query = query.filter(paths::id.gt(after_id));
    }

    let result = query
        .order(paths::id.asc())
        .limit(limit)
        .load::<TrackedPath>(conn)?;
    Ok(result)
}

/// Purges a path and (by cascading) its complete version history.
pub fn delete(conn: &SqliteConnection, id: i64) -> Result<()> {
    let deleted = diesel::delete(paths::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(HistoryDBError::NotFound);
    }

    Ok(())
}

impl PagedQuery for PathFilter {
    type Item = TrackedPath;
    type Key = i64;

    fn load_page(
        &self,
        conn: &SqliteConnection,
        after: Option<&i64>,
        limit: i64,
    ) -> Result<Vec<TrackedPath>> {
        find(conn, self, after.cloned(), limit)
    }

    fn key_of(item: &TrackedPath) -> i64 {
        item.id
    }
}
