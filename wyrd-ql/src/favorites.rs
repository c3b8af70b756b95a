//! The user's favorite phenomena
//!
//! Stored under one key as a JSON array of ids. Every storage failure is
//! caught here and logged; callers only see an empty list or a `false`.
//! There is no coordination between two stores sharing one storage.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{error, warn};
use wyrd_common::artifact_io::write_bytes_atomic;
use wyrd_common::layout::is_safe_id;

/// Storage key holding the favorites list
pub const STORAGE_KEY: &str = "wyrdness_favorites";

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to read {key}: {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("Stored value for {key} is not a list of ids: {reason}")]
    Decode { key: String, reason: String },
}

/// String key/value storage, shaped like browser local storage
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove_item(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned(key: &str) -> String {
        format!("storage lock poisoned while accessing {}", key)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let items = self.items.lock().map_err(|_| PersistenceError::Read {
            key: key.to_string(),
            reason: Self::poisoned(key),
        })?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut items = self.items.lock().map_err(|_| PersistenceError::Write {
            key: key.to_string(),
            reason: Self::poisoned(key),
        })?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), PersistenceError> {
        let mut items = self.items.lock().map_err(|_| PersistenceError::Write {
            key: key.to_string(),
            reason: Self::poisoned(key),
        })?;
        items.remove(key);
        Ok(())
    }
}

/// One `{key}.json` file per key in a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, String> {
        if !is_safe_id(key) {
            return Err(format!("invalid storage key: {:?}", key));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let read_error = |reason: String| PersistenceError::Read {
            key: key.to_string(),
            reason,
        };
        let path = self.path_for(key).map_err(read_error)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(read_error(e.to_string())),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let write_error = |reason: String| PersistenceError::Write {
            key: key.to_string(),
            reason,
        };
        let path = self.path_for(key).map_err(write_error)?;
        write_bytes_atomic(&path, value.as_bytes()).map_err(|e| write_error(e.to_string()))
    }

    fn remove_item(&self, key: &str) -> Result<(), PersistenceError> {
        let write_error = |reason: String| PersistenceError::Write {
            key: key.to_string(),
            reason,
        };
        let path = self.path_for(key).map_err(write_error)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(write_error(e.to_string())),
        }
    }
}

/// Change notification, sent after the change is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FavoritesEvent {
    Added { id: String },
    Removed { id: String },
    Cleared,
    Imported { count: usize },
}

/// Favorites over one storage handle
pub struct FavoritesStore<S: Storage> {
    storage: S,
    events: broadcast::Sender<FavoritesEvent>,
}

impl<S: Storage> FavoritesStore<S> {
    pub fn new(storage: S) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { storage, events }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FavoritesEvent> {
        self.events.subscribe()
    }

    /// Stored ids in insertion order; empty when unreadable
    pub fn get(&self) -> Vec<String> {
        match self.load() {
            Ok(ids) => ids,
            Err(e) => {
                error!("Error reading favorites: {}", e);
                Vec::new()
            }
        }
    }

    /// Add `id` if absent; true when it was added and saved
    pub fn add(&self, id: &str) -> bool {
        let mut ids = self.get();
        if ids.iter().any(|existing| existing == id) {
            return false;
        }
        ids.push(id.to_string());
        if !self.save(&ids) {
            return false;
        }
        self.notify(FavoritesEvent::Added { id: id.to_string() });
        true
    }

    /// Remove `id`; true when it was present and the change saved
    pub fn remove(&self, id: &str) -> bool {
        let ids = self.get();
        let remaining: Vec<String> = ids.iter().filter(|existing| *existing != id).cloned().collect();
        if remaining.len() == ids.len() {
            return false;
        }
        if !self.save(&remaining) {
            return false;
        }
        self.notify(FavoritesEvent::Removed { id: id.to_string() });
        true
    }

    /// Flip membership of `id`; returns whether it is now a favorite
    pub fn toggle(&self, id: &str) -> bool {
        if self.has(id) {
            self.remove(id);
        } else {
            self.add(id);
        }
        self.has(id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.get().iter().any(|existing| existing == id)
    }

    pub fn count(&self) -> usize {
        self.get().len()
    }

    pub fn clear(&self) -> bool {
        if let Err(e) = self.storage.remove_item(STORAGE_KEY) {
            error!("Error clearing favorites: {}", e);
            return false;
        }
        self.notify(FavoritesEvent::Cleared);
        true
    }

    /// Pretty-printed JSON array of the stored ids
    pub fn export_json(&self) -> Vec<u8> {
        serde_json::to_vec_pretty(&self.get()).unwrap_or_else(|_| b"[]".to_vec())
    }

    /// Replace the stored set with a JSON array of ids
    ///
    /// Repeated ids keep their first position. Anything other than an array
    /// of strings leaves the stored set untouched and returns false.
    pub fn import_json(&self, json: &str) -> bool {
        let imported: Vec<String> = match serde_json::from_str(json) {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Error importing favorites: {}", e);
                return false;
            }
        };
        let mut seen = HashSet::new();
        let ids: Vec<String> = imported.into_iter().filter(|id| seen.insert(id.clone())).collect();

        if !self.save(&ids) {
            return false;
        }
        self.notify(FavoritesEvent::Imported { count: ids.len() });
        true
    }

    fn load(&self) -> Result<Vec<String>, PersistenceError> {
        match self.storage.get_item(STORAGE_KEY)? {
            None => Ok(Vec::new()),
            Some(stored) => serde_json::from_str(&stored).map_err(|e| PersistenceError::Decode {
                key: STORAGE_KEY.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn save(&self, ids: &[String]) -> bool {
        let result = serde_json::to_string(ids)
            .map_err(|e| PersistenceError::Write {
                key: STORAGE_KEY.to_string(),
                reason: e.to_string(),
            })
            .and_then(|encoded| self.storage.set_item(STORAGE_KEY, &encoded));

        match result {
            Ok(()) => true,
            Err(e) => {
                error!("Error saving favorites: {}", e);
                false
            }
        }
    }

    fn notify(&self, event: FavoritesEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}
