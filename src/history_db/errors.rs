use super::*;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum HistoryDBError {
    DBMigrationError {
        source: db_migration::MigrationError,
    },
    // Connection, pool checkout or lock wait failures. Callers decide on retries/backoff.
    BackendUnavailable {
        source: Box<dyn Error + Send + Sync>,
    },
    ConstraintViolation {
        source: diesel::result::Error,
    },
    GenericSQLError {
        source: diesel::result::Error,
    },
    NotFound,
    ViolatesDBConsistency {
        message: &'static str,
    },
}
pub type Result<T> = std::result::Result<T, HistoryDBError>;

impl HistoryDBError {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }
}

fn is_backend_busy(error: &diesel::result::Error) -> bool {
    match error {
        diesel::result::Error::DatabaseError(_, info) => {
            let message = info.message();
            message.contains("is locked") || message.contains("busy")
        }
        _ => false,
    }
}

fn is_unique_violation(error: &diesel::result::Error) -> bool {
    use diesel::result::DatabaseErrorKind;

    match error {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => true,
        // Older SQLite builds only report the primary error code.
        diesel::result::Error::DatabaseError(_, info) => {
            info.message().starts_with("UNIQUE constraint failed")
        }
        _ => false,
    }
}

fn is_foreign_key_violation(error: &diesel::result::Error) -> bool {
    use diesel::result::DatabaseErrorKind;

    match error {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => true,
        diesel::result::Error::DatabaseError(_, info) => {
            info.message().starts_with("FOREIGN KEY constraint failed")
        }
        _ => false,
    }
}

// Error Boilerplate (Error display, conversion and source)
impl fmt::Display for HistoryDBError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error During History Interaction({:?})", self)
    }
}
impl From<db_migration::MigrationError> for HistoryDBError {
    fn from(error: db_migration::MigrationError) -> Self {
        Self::DBMigrationError { source: error }
    }
}
impl From<diesel::result::Error> for HistoryDBError {
    fn from(error: diesel::result::Error) -> Self {
        if is_backend_busy(&error) {
            return Self::BackendUnavailable {
                source: Box::new(error),
            };
        }
        if is_unique_violation(&error) {
            return Self::ConstraintViolation { source: error };
        }
        // Only versions reference other rows, the referenced path is missing.
        if is_foreign_key_violation(&error) {
            return Self::NotFound;
        }
        match error {
            diesel::result::Error::NotFound => Self::NotFound,
            error => Self::GenericSQLError { source: error },
        }
    }
}
impl From<diesel::result::ConnectionError> for HistoryDBError {
    fn from(error: diesel::result::ConnectionError) -> Self {
        Self::BackendUnavailable {
            source: Box::new(error),
        }
    }
}
impl From<r2d2::Error> for HistoryDBError {
    fn from(error: r2d2::Error) -> Self {
        Self::BackendUnavailable {
            source: Box::new(error),
        }
    }
}
impl Error for HistoryDBError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DBMigrationError { ref source } => Some(source),
            Self::BackendUnavailable { ref source } => Some(source.as_ref()),
            Self::ConstraintViolation { ref source } => Some(source),
            Self::GenericSQLError { ref source } => Some(source),
            Self::NotFound => None,
            Self::ViolatesDBConsistency { .. } => None,
        }
    }
}
