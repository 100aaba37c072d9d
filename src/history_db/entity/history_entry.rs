use super::{TrackedPath, Version};

/// One row of the joined path/version history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub path: TrackedPath,
    pub version: Version,
}

impl HistoryEntry {
    pub fn from_join_tuple(path: TrackedPath, version: Version) -> Self {
        Self { path, version }
    }
}
