use super::*;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum MigrationError {
    ReadWriteSchemaVersion {
        source: diesel::result::Error,
    },
    // The database was provisioned by a newer build, we must not touch it.
    NewerSchemaVersion {
        found: DBVersion,
        supported: DBVersion,
    },
    MissingMigration {
        from: DBVersion,
    },
    RevertFailed {
        version: DBVersion,
        source: diesel::result::Error,
    },
    SQLError {
        source: diesel::result::Error,
    },
}
pub type Result<T> = std::result::Result<T, MigrationError>;

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewerSchemaVersion { found, supported } => write!(
                f,
                "History schema version {} is newer than the supported version {}",
                found, supported
            ),
            Self::MissingMigration { from } => {
                write!(f, "No history schema migration from version {}", from)
            }
            Self::RevertFailed { version, source } => write!(
                f,
                "Could not revert history schema version {} ({})",
                version, source
            ),
            _ => write!(f, "Error During History Schema Migration ({:?})", self),
        }
    }
}
impl From<diesel::result::Error> for MigrationError {
    fn from(error: diesel::result::Error) -> Self {
        Self::SQLError { source: error }
    }
}
impl Error for MigrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ReadWriteSchemaVersion { ref source } => Some(source),
            Self::RevertFailed { ref source, .. } => Some(source),
            Self::SQLError { ref source } => Some(source),
            Self::NewerSchemaVersion { .. } | Self::MissingMigration { .. } => None,
        }
    }
}
