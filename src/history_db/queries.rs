use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::path_repository::PathFilter;
use super::records::PagedQuery;
use super::schema::{paths, versions};
use super::{HistoryEntry, Result, TrackedPath, Version};

/// Joined path/version history of all paths matching a PathFilter,
/// ordered by path and then version number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryQuery {
    pub filter: PathFilter,
}

impl HistoryQuery {
    pub fn new(filter: PathFilter) -> Self {
        HistoryQuery { filter }
    }
}

impl PagedQuery for HistoryQuery {
    type Item = HistoryEntry;
    type Key = (i64, i64);

    fn load_page(
        &self,
        conn: &SqliteConnection,
        after: Option<&(i64, i64)>,
        limit: i64,
    ) -> Result<Vec<HistoryEntry>> {
        let mut query = paths::table.inner_join(versions::table).into_boxed();
        if let Some(ref location) = self.filter.location {
            query = query.filter(paths::location.eq(location.as_str()));
        }
        if let Some(ref name) = self.filter.name {
            query = query.filter(paths::name.eq(name.as_str()));
        }
        if let Some(&(path_id, version_no)) = after {
            query = query.filter(
                versions::path_id.gt(path_id).or(versions::path_id
                    .eq(path_id)
                    .and(versions::version_no.gt(version_no))),
            );
        }

        let result = query
            .order((versions::path_id.asc(), versions::version_no.asc()))
            .limit(limit)
            .load::<(TrackedPath, Version)>(conn)?
            .into_iter()
            .map(|(path, version)| HistoryEntry::from_join_tuple(path, version))
            .collect();
        Ok(result)
    }

    fn key_of(item: &HistoryEntry) -> (i64, i64) {
        (item.version.path_id, item.version.version_no)
    }
}
