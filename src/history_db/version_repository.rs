use diesel::dsl::max;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::entity::version;
use super::records::PagedQuery;
use super::schema::versions;
use super::{Attributes, Result, Version};

/// Optional exact-match filters on versions, combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionFilter {
    pub path_id: Option<i64>,
    pub version_no: Option<i64>,
}

impl VersionFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn for_path(path_id: i64) -> Self {
        VersionFilter {
            path_id: Some(path_id),
            version_no: None,
        }
    }

    pub fn with_version_no(mut self, version_no: i64) -> Self {
        self.version_no = Some(version_no);
        self
    }
}

/// Inserts a new version. Fails with a ConstraintViolation if (path_id, version_no) exists.
pub fn create(
    conn: &SqliteConnection,
    path_id: i64,
    version_no: i64,
    attrs: &Attributes,
) -> Result<Version> {
    diesel::insert_into(versions::table)
        .values(version::InsertFull {
            path_id,
            version_no,
            attrs,
        })
        .execute(conn)?;

    let result = versions::table
        .find((path_id, version_no))
        .first::<Version>(conn)?;
    Ok(result)
}

/// Highest version number recorded for the path, None if it has no versions (yet).
pub fn max_version_no(conn: &SqliteConnection, path_id: i64) -> Result<Option<i64>> {
    let result = versions::table
        .filter(versions::path_id.eq(path_id))
        .select(max(versions::version_no))
        .first::<Option<i64>>(conn)?;
    Ok(result)
}

/// Lists at most limit versions matching the filter, ordered by (path_id, version_no) and
/// starting after the given key.
pub fn find(
    conn: &SqliteConnection,
    filter: &VersionFilter,
    after: Option<(i64, i64)>,
    limit: i64,
) -> Result<Vec<Version>> {
    let mut query = versions::table.into_boxed();
    if let Some(path_id) = filter.path_id {
        query = query.filter(versions::path_id.eq(path_id));
    }
    if let Some(version_no) = filter.version_no {
        query = query.filter(versions::version_no.eq(version_no));
    }
    if let Some((path_id, version_no)) = after {
        query = query.filter(
            versions::path_id.gt(path_id).or(versions::path_id
                .eq(path_id)
                .and(versions::version_no.gt(version_no))),
        );
    }

    let result = query
        .order((versions::path_id.asc(), versions::version_no.asc()))
        .limit(limit)
        .load::<Version>(conn)?;
    Ok(result)
}

impl PagedQuery for VersionFilter {
    type Item = Version;
    type Key = (i64, i64);

    fn load_page(
        &self,
        conn: &SqliteConnection,
        after: Option<&(i64, i64)>,
        limit: i64,
    ) -> Result<Vec<Version>> {
        find(conn, self, after.cloned(), limit)
    }

    fn key_of(item: &Version) -> (i64, i64) {
        (item.path_id, item.version_no)
    }
}
