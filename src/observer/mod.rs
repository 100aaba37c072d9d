//! Captures the attributes of filesystem entries, i.e. what gets recorded as one version.
mod errors;
pub use self::errors::*;
#[cfg(test)]
mod tests;

use chrono::{DateTime, NaiveDateTime, Utc};
use data_encoding::HEXUPPER;
use filetime::FileTime;
use ring::digest;
use serde::Serialize;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use crate::history_db::Attributes;

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// The (location, name) pair an entry is tracked under in the history database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPath {
    pub location: String,
    pub name: String,
}

impl EntryPath {
    /// Splits an absolute path into its parent directory and its final component.
    /// Relative paths are resolved against the current working directory first,
    /// '.' and '..' components are resolved lexically (symlinks are not followed).
    /// The root directory itself has an empty location.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<EntryPath> {
        let path = absolute_path(path.as_ref())?;

        let (location, name) = match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) => (parent.as_os_str(), name),
            _ => (Path::new("").as_os_str(), path.as_os_str()),
        };
        match (location.to_str(), name.to_str()) {
            (Some(location), Some(name)) => Ok(EntryPath {
                location: location.to_string(),
                name: name.to_string(),
            }),
            _ => Err(ObserverError::NonUnicodePath { path: path.clone() }),
        }
    }

    pub fn to_path_buf(&self) -> PathBuf {
        Path::new(&self.location).join(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    File,
    Directory,
    Symlink,
}

/// Metadata of one entry at the time it was observed.
///
/// Symbolic links are recorded as such and never followed.
/// Only files carry a content hash (upper case hex SHA-256).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub entry_type: EntryType,
    pub size: u64,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
    pub mod_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Observation {
    pub fn to_attributes(&self) -> Result<Attributes> {
        Ok(Attributes(serde_json::to_value(self)?))
    }
}

/// Observes the entry at the given path.
pub fn observe<P: AsRef<Path>>(path: P) -> Result<(EntryPath, Observation)> {
    let entry_path = EntryPath::from_path(path)?;
    let fs_path = entry_path.to_path_buf();
    let metadata = fs::symlink_metadata(&fs_path)?;

    let file_type = metadata.file_type();
    let entry_type = if file_type.is_symlink() {
        EntryType::Symlink
    } else if file_type.is_dir() {
        EntryType::Directory
    } else {
        EntryType::File
    };
    let hash = if entry_type == EntryType::File {
        Some(calculate_hash(&fs_path)?)
    } else {
        None
    };

    let mod_time = FileTime::from_last_modification_time(&metadata);
    let observation = Observation {
        entry_type,
        size: metadata.len(),
        read_only: metadata.permissions().readonly(),
        mode: permission_mode(&metadata),
        mod_time: DateTime::<Utc>::from_timestamp(mod_time.unix_seconds(), mod_time.nanoseconds())
            .map(|mod_time| mod_time.naive_utc()),
        hash,
    };

    Ok((entry_path, observation))
}

pub fn calculate_hash(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut context = digest::Context::new(&digest::SHA256);

    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        context.update(&buffer[..read]);
    }

    Ok(HEXUPPER.encode(context.finish().as_ref()))
}

fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };

    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => (),
            // '..' at the root stays at the root.
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other),
        }
    }
    Ok(result)
}

#[cfg(unix)]
fn permission_mode(metadata: &fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn permission_mode(_metadata: &fs::Metadata) -> Option<u32> {
    None
}
