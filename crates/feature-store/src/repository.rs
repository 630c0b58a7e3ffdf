//! Named Feature List Snapshots

use crate::codec::{read_features, write_features};
use crate::StorageError;
use feature_engine::FeatureList;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Default number of snapshots retained before the oldest is evicted
pub const DEFAULT_MAX_SNAPSHOTS: usize = 64;

/// In-memory store of named feature lists with file persistence
pub struct FeatureRepository {
    /// Snapshots in insertion order
    snapshots: Mutex<VecDeque<(String, FeatureList)>>,
    /// Max snapshots kept in memory
    max_snapshots: usize,
}

impl FeatureRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_SNAPSHOTS)
    }

    /// Create an empty repository retaining at most `max_snapshots` lists
    pub fn with_capacity(max_snapshots: usize) -> Self {
        Self {
            snapshots: Mutex::new(VecDeque::with_capacity(max_snapshots.min(DEFAULT_MAX_SNAPSHOTS))),
            max_snapshots: max_snapshots.max(1),
        }
    }

    /// Store a list under `name`, replacing any previous list of that name
    pub fn put(&self, name: &str, list: FeatureList) -> Result<(), StorageError> {
        let mut snapshots = self.lock()?;
        snapshots.retain(|(existing, _)| existing != name);

        // Enforce retention
        while snapshots.len() >= self.max_snapshots {
            if let Some((evicted, _)) = snapshots.pop_front() {
                debug!("Evicted snapshot {}", evicted);
            }
        }

        debug!("Stored snapshot {} ({} records)", name, list.len());
        snapshots.push_back((name.to_string(), list));
        Ok(())
    }

    /// Clone of the list stored under `name`
    pub fn get(&self, name: &str) -> Result<Option<FeatureList>, StorageError> {
        let snapshots = self.lock()?;
        Ok(snapshots
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, list)| list.clone()))
    }

    /// Remove and return the list stored under `name`
    pub fn remove(&self, name: &str) -> Result<Option<FeatureList>, StorageError> {
        let mut snapshots = self.lock()?;
        let position = snapshots.iter().position(|(existing, _)| existing == name);
        Ok(position
            .and_then(|i| snapshots.remove(i))
            .map(|(_, list)| list))
    }

    /// Snapshot names, oldest first
    pub fn names(&self) -> Vec<String> {
        self.snapshots
            .lock()
            .map(|s| s.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the list stored under `name` to `path` in the fixed-width layout
    pub fn persist(&self, name: &str, path: impl AsRef<Path>) -> Result<(), StorageError> {
        let path = path.as_ref();
        let list = self
            .get(name)?
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;

        let mut writer = BufWriter::new(File::create(path)?);
        write_features(&mut writer, &list)?;
        writer.flush()?;

        info!("Persisted snapshot {} to {}", name, path.display());
        Ok(())
    }

    /// Load a fixed-width file into the repository under `name`
    pub fn restore(&self, name: &str, path: impl AsRef<Path>) -> Result<usize, StorageError> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let list = read_features(&mut reader)?;
        let count = list.len();
        self.put(name, list)?;

        info!("Restored snapshot {} from {} ({} records)", name, path.display(), count);
        Ok(count)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, VecDeque<(String, FeatureList)>>, StorageError> {
        self.snapshots
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl Default for FeatureRepository {
    fn default() -> Self {
        Self::new()
    }
}
