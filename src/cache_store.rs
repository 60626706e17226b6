//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Persistent key-value stores used to cache credentials and metadata
//! between sessions.
use crate::auth_common::file_utils::expand_user_home;
use crate::error::{SeaTableError, SeaTableErrorCode};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{trace, warn};

/// Trait defining a persistent key-value store for cached client state.
///
/// All calls are synchronous; implementations must not block for long.
pub trait CacheStore: Send + Sync + Debug {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), SeaTableError>;
    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), SeaTableError>;
    /// Store several entries as one operation.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), SeaTableError> {
        for (k, v) in entries {
            self.set(k, v)?;
        }
        Ok(())
    }
    /// Remove several keys as one operation.
    fn remove_many(&self, keys: &[&str]) -> Result<(), SeaTableError> {
        for k in keys {
            self.remove(k)?;
        }
        Ok(())
    }
}

/// A [`CacheStore`] that lives only as long as the process.
///
/// This is the default store for a [`Handle`](crate::Handle).
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    // never held across awaits
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryCacheStore {
    pub fn new() -> MemoryCacheStore {
        MemoryCacheStore {
            ..Default::default()
        }
    }
}

fn poisoned() -> SeaTableError {
    SeaTableError::new(SeaTableErrorCode::CacheError, "cache store lock poisoned")
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }
    fn set(&self, key: &str, value: &str) -> Result<(), SeaTableError> {
        let mut guard = self.entries.lock().map_err(|_| poisoned())?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
    fn remove(&self, key: &str) -> Result<(), SeaTableError> {
        let mut guard = self.entries.lock().map_err(|_| poisoned())?;
        guard.remove(key);
        Ok(())
    }
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), SeaTableError> {
        let mut guard = self.entries.lock().map_err(|_| poisoned())?;
        for (k, v) in entries {
            guard.insert(k.to_string(), v.to_string());
        }
        Ok(())
    }
    fn remove_many(&self, keys: &[&str]) -> Result<(), SeaTableError> {
        let mut guard = self.entries.lock().map_err(|_| poisoned())?;
        for k in keys {
            guard.remove(*k);
        }
        Ok(())
    }
}

/// A [`CacheStore`] backed by a single JSON file.
///
/// The whole file is rewritten after every change. A missing file is an empty
/// store; an unreadable or corrupt file is treated as empty and replaced on the
/// next write.
#[derive(Debug)]
pub struct FileCacheStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileCacheStore {
    /// Open (or lazily create) the store at `path`. A leading `~/` is expanded
    /// to the user's home directory.
    pub fn new(path: &str) -> Result<FileCacheStore, SeaTableError> {
        let path = PathBuf::from(expand_user_home(path)?);
        let entries = Self::load(&path);
        trace!("opened file cache store {} ({} entries)", path.display(), entries.len());
        Ok(FileCacheStore {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> BTreeMap<String, String> {
        let data = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(_) => return BTreeMap::new(),
        };
        match serde_json::from_str(&data) {
            Ok(m) => m,
            Err(e) => {
                warn!("ignoring corrupt cache file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), SeaTableError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }
    fn set(&self, key: &str, value: &str) -> Result<(), SeaTableError> {
        self.set_many(&[(key, value)])
    }
    fn remove(&self, key: &str) -> Result<(), SeaTableError> {
        self.remove_many(&[key])
    }
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), SeaTableError> {
        let mut guard = self.entries.lock().map_err(|_| poisoned())?;
        for (k, v) in entries {
            guard.insert(k.to_string(), v.to_string());
        }
        self.persist(&guard)
    }
    fn remove_many(&self, keys: &[&str]) -> Result<(), SeaTableError> {
        let mut guard = self.entries.lock().map_err(|_| poisoned())?;
        for k in keys {
            guard.remove(*k);
        }
        self.persist(&guard)
    }
}
