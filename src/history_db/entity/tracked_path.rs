use super::schema::paths;
use std::fmt;
use std::path::Path;

/// A filesystem entry tracked by the history database.
/// Identified by its parent directory (location) and its name within that directory.
#[derive(Debug, Queryable, Clone, PartialEq)]
pub struct TrackedPath {
    pub id: i64,

    pub location: String,
    pub name: String,
}

#[derive(Insertable)]
#[table_name = "paths"]
pub struct InsertFull<'a> {
    pub location: &'a str,
    pub name: &'a str,
}

impl fmt::Display for TrackedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Path::new(&self.location).join(&self.name).display())
    }
}
