use super::schema;

// Basic entity mappings on database tables (Should be mostly 1:1 copies of our schema and helpers).
pub mod attributes;
pub use self::attributes::Attributes;
pub mod tracked_path;
pub use self::tracked_path::TrackedPath;
pub mod version;
pub use self::version::Version;
pub mod history_entry;
pub use self::history_entry::HistoryEntry;
