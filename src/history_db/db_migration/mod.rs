/// Module performing database migrations to newer application/database format versions.
/// Used on an existing DB connection to upgrade it to the most recent version.
///
/// upgrade_db(&conn); // creates or upgrades the path/version relations
/// drop_db(&conn);    // removes them including all recorded history
mod errors;
pub use self::errors::*;
mod version_001;

use diesel::prelude::*;
use diesel::sql_query;
use diesel::sqlite::SqliteConnection;

pub type DBVersion = i32;
pub const REQUIRED_DB_VERSION: DBVersion = 1;

/// Upgrades the given database connection to the REQUIRED_DB_VERSION of the
/// current application build.
///
/// Safe to call on an already provisioned database, it simply reports the current version.
/// Fails for databases written by a newer application build.
pub fn upgrade_db(conn: &SqliteConnection) -> Result<DBVersion> {
    loop {
        let current_version = read_db_version(&conn)?;
        if current_version < REQUIRED_DB_VERSION {
            migrate_up_from(conn, current_version)?;
        } else if current_version > REQUIRED_DB_VERSION {
            return Err(MigrationError::NewerSchemaVersion {
                found: current_version,
                supported: REQUIRED_DB_VERSION,
            });
        } else {
            return Ok(current_version);
        }
    }
}

/// Reverts all migrations, dropping every relation and its content.
/// Afterwards the database is in the same state as a freshly created one.
pub fn drop_db(conn: &SqliteConnection) -> Result<()> {
    version_001::revert(&conn)
        .map_err(|source| MigrationError::RevertFailed { version: 1, source })?;
    write_db_version(&conn, 0)?;

    Ok(())
}

/// Migrates the given database connection from the DBVersion version to (version + 1).
/// Expects the database to be in the given version and updates the user_version pragma
/// to the new (version + 1) value if successful.
///
/// Does not wrap the operation in a transaction,
/// the caller is supposed to if a rollback might be required.
fn migrate_up_from(conn: &SqliteConnection, version: DBVersion) -> Result<()> {
    match version {
        0 => version_001::migrate(&conn)?,
        // We do not know how to handle this migration.
        _ => return Err(MigrationError::MissingMigration { from: version }),
    };

    write_db_version(&conn, version + 1)?;
    Ok(())
}

fn read_db_version(conn: &SqliteConnection) -> Result<DBVersion> {
    use diesel::sql_types::Integer;
    #[derive(QueryableByName)]
    struct UserVersion {
        #[sql_type = "Integer"]
        user_version: DBVersion,
    }

    let result = sql_query("PRAGMA user_version")
        .get_result::<UserVersion>(conn)
        .map_err(|source| MigrationError::ReadWriteSchemaVersion { source })?;

    Ok(result.user_version)
}

fn write_db_version(conn: &SqliteConnection, version: DBVersion) -> Result<()> {
    sql_query(format!("PRAGMA user_version = {}", version))
        .execute(conn)
        .map_err(|source| MigrationError::ReadWriteSchemaVersion { source })?;

    Ok(())
}
