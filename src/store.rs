//! Key/value persistence behind the profile, analytics and island progress.
//!
//! Two backends: `MemoryStore` (default, lost on restart) and `FileStore`
//! (one `<key>.json` per key in a data directory). Reads never fail: an absent
//! or unreadable record reads as `None` and the typed loaders fall back to defaults.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::RwLock,
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::profile::Profile;

pub const PROFILE_KEY: &str = "talentia_profile";
pub const ANALYTICS_KEY: &str = "talentia_analytics";
pub const PROGRESS_KEY: &str = "talentia_progress";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(s) => Some(s),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(target: "talentia_backend", path = %path.display(), error = %e, "Failed to read store record");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Write-then-rename so a crash never leaves a half-written record.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(target: "talentia_backend", path = %path.display(), bytes = value.len(), "Store record written");
        Ok(())
    }
}

pub fn load_profile(store: &dyn KeyValueStore) -> Profile {
    match store.get(PROFILE_KEY) {
        Some(raw) => Profile::from_json(&raw),
        None => Profile::default(),
    }
}

pub fn save_profile(store: &dyn KeyValueStore, profile: &Profile) -> Result<(), StoreError> {
    save_json(store, PROFILE_KEY, profile)
}

/// Typed read for whole-record values; absent or corrupt records read as `T::default()`.
pub fn load_json<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    let Some(raw) = store.get(key) else {
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(target: "talentia_backend", %key, error = %e, "Corrupt store record; using defaults");
            T::default()
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
