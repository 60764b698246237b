//! Client-side store for records the backend could not confirm.
//!
//! # Design
//! `MirrorStore` is a port so the service never reaches for ambient
//! storage directly. Each key holds an ordered sequence of `LocalRecord`s.
//! Reads are forgiving: an absent or corrupt entry reads as the caller's
//! default. Writes are not: a failed write is always reported.
//!
//! `append` is a plain read-modify-write with no locking. Two writers
//! appending to the same key can lose one of the records.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::types::LocalRecord;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("mirror I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("mirror encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("mirror lock poisoned")]
    Poisoned,
}

pub trait MirrorStore {
    /// The sequence stored under `key`, or `default` if absent or unreadable.
    fn get(&self, key: &str, default: Vec<LocalRecord>) -> Vec<LocalRecord>;

    /// Replace the sequence stored under `key`.
    fn set(&self, key: &str, records: &[LocalRecord]) -> Result<(), StorageError>;

    fn append(&self, key: &str, record: LocalRecord) -> Result<(), StorageError> {
        let mut records = self.get(key, Vec::new());
        records.push(record);
        self.set(key, &records)
    }

    fn find<P>(&self, key: &str, predicate: P) -> Option<LocalRecord>
    where
        P: FnMut(&LocalRecord) -> bool,
        Self: Sized,
    {
        self.get(key, Vec::new()).into_iter().find(predicate)
    }
}

impl<M: MirrorStore + ?Sized> MirrorStore for &M {
    fn get(&self, key: &str, default: Vec<LocalRecord>) -> Vec<LocalRecord> {
        (**self).get(key, default)
    }

    fn set(&self, key: &str, records: &[LocalRecord]) -> Result<(), StorageError> {
        (**self).set(key, records)
    }
}

fn decode(raw: &str) -> Option<Vec<LocalRecord>> {
    match serde_json::from_str(raw) {
        Ok(records) => Some(records),
        Err(err) => {
            tracing::debug!(%err, "ignoring unreadable mirror entry");
            None
        }
    }
}

/// In-process mirror holding each key as serialized JSON text.
#[derive(Debug, Default)]
pub struct MemoryMirror {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text under `key`, bypassing encoding.
    pub fn insert_raw(&self, key: &str, raw: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), raw.to_string());
        Ok(())
    }
}

impl MirrorStore for MemoryMirror {
    fn get(&self, key: &str, default: Vec<LocalRecord>) -> Vec<LocalRecord> {
        let Ok(entries) = self.entries.lock() else {
            return default;
        };
        entries
            .get(key)
            .and_then(|raw| decode(raw))
            .unwrap_or(default)
    }

    fn set(&self, key: &str, records: &[LocalRecord]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(records)?;
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), raw);
        Ok(())
    }
}

/// Durable mirror: one JSON document on disk mapping keys to sequences.
///
/// A missing file reads as empty. Writes go to a sibling temp file that is
/// renamed over the document.
#[derive(Debug, Clone)]
pub struct FileMirror {
    path: PathBuf,
}

impl FileMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, Value>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl MirrorStore for FileMirror {
    fn get(&self, key: &str, default: Vec<LocalRecord>) -> Vec<LocalRecord> {
        let mut document = match self.load() {
            Ok(document) => document,
            Err(err) => {
                tracing::debug!(%err, path = %self.path.display(), "mirror file unreadable");
                return default;
            }
        };
        match document.remove(key) {
            Some(value) => serde_json::from_value(value).unwrap_or(default),
            None => default,
        }
    }

    fn set(&self, key: &str, records: &[LocalRecord]) -> Result<(), StorageError> {
        // A corrupt document is replaced rather than blocking every write.
        let mut document = self.load().unwrap_or_default();
        document.insert(key.to_string(), serde_json::to_value(records)?);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&document)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// The mirror chosen by `ClientConfig::mirror_path`: on disk when a path
/// is configured, in memory otherwise.
#[derive(Debug)]
pub enum ConfiguredMirror {
    Memory(MemoryMirror),
    File(FileMirror),
}

impl ConfiguredMirror {
    pub fn from_config(config: &ClientConfig) -> Self {
        match &config.mirror_path {
            Some(path) => ConfiguredMirror::File(FileMirror::new(path)),
            None => ConfiguredMirror::Memory(MemoryMirror::new()),
        }
    }
}

impl MirrorStore for ConfiguredMirror {
    fn get(&self, key: &str, default: Vec<LocalRecord>) -> Vec<LocalRecord> {
        match self {
            ConfiguredMirror::Memory(mirror) => mirror.get(key, default),
            ConfiguredMirror::File(mirror) => mirror.get(key, default),
        }
    }

    fn set(&self, key: &str, records: &[LocalRecord]) -> Result<(), StorageError> {
        match self {
            ConfiguredMirror::Memory(mirror) => mirror.set(key, records),
            ConfiguredMirror::File(mirror) => mirror.set(key, records),
        }
    }
}
