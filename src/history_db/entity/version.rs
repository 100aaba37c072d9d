use super::schema::versions;
use super::Attributes;

/// Immutable snapshot of a path's attributes.
/// (path_id, version_no) is the natural key, numbers per path run 1, 2, 3, ... without gaps.
#[derive(Debug, Queryable, Clone, PartialEq)]
pub struct Version {
    pub path_id: i64,
    pub version_no: i64,

    pub attrs: Attributes,
}

#[derive(Insertable)]
#[table_name = "versions"]
pub struct InsertFull<'a> {
    pub path_id: i64,
    pub version_no: i64,

    pub attrs: &'a Attributes,
}
