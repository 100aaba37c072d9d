use super::*;

pub fn migrate(conn: &SqliteConnection) -> Result<()> {
    create_table_paths(&conn)?;
    create_table_versions(&conn)?;

    Ok(())
}

pub fn revert(conn: &SqliteConnection) -> diesel::QueryResult<()> {
    // Versions reference paths, drop them first.
    sql_query("DROP TABLE IF EXISTS versions").execute(conn)?;
    sql_query("DROP TABLE IF EXISTS paths").execute(conn)?;

    Ok(())
}

// A path is a tracked filesystem entry, identified by its parent directory and its name.
// Ids are never handed out twice (AUTOINCREMENT), not even after a path was purged.
fn create_table_paths(conn: &SqliteConnection) -> Result<()> {
    sql_query(
        "CREATE TABLE IF NOT EXISTS paths(
                id          INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,

                location    TEXT NOT NULL,
                name        TEXT NOT NULL,

                UNIQUE(location, name)
             )",
    )
    .execute(conn)?;

    Ok(())
}

// A version is one observed attribute snapshot of a path.
// Numbers per path form the sequence 1, 2, 3, ... and the pair (path_id, version_no)
// is the natural key. Purging a path removes its complete history.
fn create_table_versions(conn: &SqliteConnection) -> Result<()> {
    sql_query(
        "CREATE TABLE IF NOT EXISTS versions(
                path_id     INTEGER NOT NULL,
                version_no  INTEGER NOT NULL CHECK(version_no > 0),

                attrs       TEXT NOT NULL,

                PRIMARY KEY(path_id, version_no),
                FOREIGN KEY(path_id)    REFERENCES paths(id) ON DELETE CASCADE
            )",
    )
    .execute(conn)?;

    Ok(())
}
