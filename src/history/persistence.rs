use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DedupSettings;
use crate::history::migration::migrate_legacy_keys;
use crate::history::store::HistoryStore;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// On-disk history of one source.
///
/// `dedup_history` (key → timestamp) is authoritative. `notified_posts` is
/// the legacy bare key list; it is read only when `dedup_history` is absent
/// and is always written back so older readers keep working.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryDocument {
    pub dedup_history: Option<Value>,
    pub notified_posts: Option<Value>,
}

impl HistoryDocument {
    pub fn from_store(store: &HistoryStore) -> Self {
        let snapshot = store.to_dict();

        let notified_posts: Vec<Value> = snapshot
            .keys()
            .map(|key| Value::String(key.as_str().to_string()))
            .collect();

        let dedup_history: Map<String, Value> = snapshot
            .into_iter()
            .map(|(key, seen)| (key.into_string(), Value::from(seen)))
            .collect();

        Self {
            dedup_history: Some(Value::Object(dedup_history)),
            notified_posts: Some(Value::Array(notified_posts)),
        }
    }

    /// Interpret any JSON value a history file may hold.
    ///
    /// Accepts the full document, a bare key → timestamp object, or a bare
    /// legacy key array. Anything else is unusable.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(mut map)
                if map.contains_key("dedup_history") || map.contains_key("notified_posts") =>
            {
                Some(Self {
                    dedup_history: map.remove("dedup_history"),
                    notified_posts: map.remove("notified_posts"),
                })
            }
            Value::Object(map) => Some(Self {
                dedup_history: Some(Value::Object(map)),
                notified_posts: None,
            }),
            Value::Array(keys) => Some(Self {
                dedup_history: None,
                notified_posts: Some(Value::Array(keys)),
            }),
            _ => None,
        }
    }

    /// Build a store from this document as of `now`.
    pub fn restore(&self, settings: &DedupSettings, now: f64) -> HistoryStore {
        let mut store = HistoryStore::from_settings(settings);

        match (&self.dedup_history, &self.notified_posts) {
            (Some(Value::Object(entries)), _) => {
                store.load_dict(entries, now);
            }
            (_, Some(Value::Array(keys))) => {
                let migrated = migrate_legacy_keys(keys, now);
                store.load_timestamps(migrated, now);
            }
            (Some(_), _) => {
                warn!("dedup_history is not an object, starting with empty history");
            }
            _ => {}
        }

        store
    }
}

/// Load a source's history from `path`, falling back to `<path>.bak`.
///
/// A missing or corrupt file is not an error: the result is an empty store.
/// Only I/O failures other than not-found propagate.
pub fn load_history(
    path: &Path,
    settings: &DedupSettings,
    now: f64,
) -> Result<HistoryStore, PersistenceError> {
    if let Some(document) = read_document(path)? {
        return Ok(document.restore(settings, now));
    }

    let backup = backup_path(path);
    if let Some(document) = read_document(&backup)? {
        info!(path = %backup.display(), "restored dedup history from backup");
        return Ok(document.restore(settings, now));
    }

    Ok(HistoryStore::from_settings(settings))
}

/// Atomically replace `path` with the current contents of `store`.
///
/// Writes `<path>.tmp`, syncs it, copies the previous file to `<path>.bak`,
/// then renames the temp file over `path`. The temp file never survives.
pub fn save_history(path: &Path, store: &HistoryStore) -> Result<(), PersistenceError> {
    let document = HistoryDocument::from_store(store);
    let temp = sibling(path, "tmp");

    let result = write_atomically(path, &temp, &document);
    if result.is_err() && temp.exists() {
        let _ = fs::remove_file(&temp);
    }
    result
}

pub fn backup_path(path: &Path) -> PathBuf {
    sibling(path, "bak")
}

fn write_atomically(
    path: &Path,
    temp: &Path,
    document: &HistoryDocument,
) -> Result<(), PersistenceError> {
    let f = fs::File::create(temp)?;
    serde_json::to_writer_pretty(&f, document)?;
    f.sync_all()?;

    if path.exists() {
        if let Err(err) = fs::copy(path, backup_path(path)) {
            warn!(path = %path.display(), error = %err, "could not back up dedup history");
        }
    }

    fs::rename(temp, path)?;
    Ok(())
}

fn read_document(path: &Path) -> Result<Option<HistoryDocument>, PersistenceError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let value = match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => value,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "corrupt dedup history file");
            return Ok(None);
        }
    };

    let document = HistoryDocument::from_value(value);
    if document.is_none() {
        warn!(path = %path.display(), "unusable dedup history file");
    }
    Ok(document)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
