/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Memoization store for accepted utilization vectors.
//!
//! The generator only needs [`UtilizationStore::get`] and
//! [`UtilizationStore::put`].  A missing or unreadable backing file is a
//! cache miss, never an error.
//!
//! File layout:
//! ```yaml
//! "12-2":
//!   - [0.41, 0.08, ...]
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// Cache key: task count and target aggregate utilization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilizationKey {
    pub task_count: usize,
    pub target_utilization: f64,
}

impl UtilizationKey {
    pub fn new(task_count: usize, target_utilization: f64) -> Self {
        Self {
            task_count,
            target_utilization,
        }
    }
}

impl fmt::Display for UtilizationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.task_count, self.target_utilization)
    }
}

/// Get/put interface consumed by the utilization generator.
pub trait UtilizationStore {
    /// Every vector previously stored under `key` (empty on a miss).
    fn get(&self, key: &UtilizationKey) -> Vec<Vec<f64>>;

    fn put(&mut self, key: &UtilizationKey, vector: Vec<f64>);
}

// ── InMemoryStore ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    entries: BTreeMap<String, Vec<Vec<f64>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UtilizationStore for InMemoryStore {
    fn get(&self, key: &UtilizationKey) -> Vec<Vec<f64>> {
        self.entries.get(&key.to_string()).cloned().unwrap_or_default()
    }

    fn put(&mut self, key: &UtilizationKey, vector: Vec<f64>) {
        self.entries.entry(key.to_string()).or_default().push(vector);
    }
}

// ── YamlFileStore ─────────────────────────────────────────────────────────────

/// [`InMemoryStore`] persisted to a YAML file on [`save`](Self::save).
#[derive(Debug)]
pub struct YamlFileStore {
    path: PathBuf,
    inner: InMemoryStore,
    dirty: bool,
}

impl YamlFileStore {
    /// Open the store at `path`.  A missing, empty or malformed file starts
    /// an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "memo store unreadable, starting empty");
                    BTreeMap::new()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "memo store not found, starting empty");
                BTreeMap::new()
            }
        };

        let inner = InMemoryStore { entries };
        info!(path = %path.display(), vectors = inner.len(), "memo store opened");
        Self {
            path,
            inner,
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Write the cache back if anything was added since opening.
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let yaml = serde_yaml::to_string(&self.inner.entries)
            .context("Failed to serialise utilization memo store")?;
        std::fs::write(&self.path, yaml)
            .with_context(|| format!("Cannot write memo store: {}", self.path.display()))?;
        self.dirty = false;
        debug!(path = %self.path.display(), "memo store saved");
        Ok(())
    }
}

impl UtilizationStore for YamlFileStore {
    fn get(&self, key: &UtilizationKey) -> Vec<Vec<f64>> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &UtilizationKey, vector: Vec<f64>) {
        self.inner.put(key, vector);
        self.dirty = true;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn key_formats_as_count_dash_utilization() {
        assert_eq!(UtilizationKey::new(12, 2.0).to_string(), "12-2");
        assert_eq!(UtilizationKey::new(8, 1.5).to_string(), "8-1.5");
    }

    #[test]
    fn in_memory_miss_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.get(&UtilizationKey::new(3, 1.0)).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn in_memory_put_appends_per_key() {
        let mut store = InMemoryStore::new();
        let k = UtilizationKey::new(2, 1.0);
        store.put(&k, vec![0.5, 0.5]);
        store.put(&k, vec![0.3, 0.7]);
        store.put(&UtilizationKey::new(2, 0.5), vec![0.25, 0.25]);
        assert_eq!(store.get(&k), vec![vec![0.5, 0.5], vec![0.3, 0.7]]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = tempdir().unwrap();
        let store = YamlFileStore::open(dir.path().join("memo.yaml"));
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_file_is_an_empty_store() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"::: not yaml [").unwrap();
        let store = YamlFileStore::open(f.path());
        assert!(store.is_empty());
    }

    #[test]
    fn saved_vectors_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memo.yaml");
        let key = UtilizationKey::new(3, 1.5);

        let mut store = YamlFileStore::open(&path);
        store.put(&key, vec![0.5, 0.25, 0.75]);
        store.save().unwrap();

        let reopened = YamlFileStore::open(&path);
        assert_eq!(reopened.get(&key), vec![vec![0.5, 0.25, 0.75]]);
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn save_without_changes_does_not_create_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memo.yaml");
        let mut store = YamlFileStore::open(&path);
        store.save().unwrap();
        assert!(!path.exists());
    }
}
