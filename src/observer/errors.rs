use super::*;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ObserverError {
    NonUnicodePath {
        path: PathBuf,
    },
    Serialization {
        source: serde_json::Error,
    },
    // IOError is simply our 'catch all' error type for 'non-special' issues
    IOError {
        source: io::Error,
        kind: std::io::ErrorKind,
    },
}
pub type Result<T> = std::result::Result<T, ObserverError>;

impl ObserverError {
    pub fn is_io_not_found(&self) -> bool {
        if let Self::IOError {
            kind: std::io::ErrorKind::NotFound,
            ..
        } = self
        {
            true
        } else {
            false
        }
    }
}
impl From<io::Error> for ObserverError {
    fn from(error: io::Error) -> Self {
        Self::IOError {
            kind: error.kind(),
            source: error,
        }
    }
}
impl From<serde_json::Error> for ObserverError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error }
    }
}
impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error when observing the FS ({:?})", self)
    }
}
impl Error for ObserverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IOError { ref source, .. } => Some(source),
            Self::Serialization { ref source } => Some(source),
            Self::NonUnicodePath { .. } => None,
        }
    }
}
