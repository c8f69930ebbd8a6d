//! Buffered write layer for a single invocation.
//!
//! An `OverlayStore` sits between an invocation and the backing store.
//! Writes and removes are buffered and visible to later reads through the
//! overlay. On success the host calls [`OverlayStore::commit`]; on failure
//! it drops the overlay and the backing store is untouched. This is the
//! host's rollback: the collections themselves never undo a write.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::HostError;
use crate::storage::StorageAdapter;
use crate::types::StoreConfig;

/// Result of looking up a key in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayResult {
    /// Key was written in this overlay with this value.
    Found(Vec<u8>),
    /// Key was removed in this overlay.
    Deleted,
    /// Key has not been touched; the backing store decides.
    NotInOverlay,
}

/// Write buffer layered over another `StorageAdapter`.
///
/// Uses `BTreeMap` so commits apply in deterministic key order.
pub struct OverlayStore<'a, S: StorageAdapter + ?Sized> {
    inner: &'a mut S,
    /// Buffered writes: key → Some(value) for writes, key → None for removals.
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    /// Total bytes buffered (keys + values) for enforcing `max_write_bytes`.
    total_write_bytes: u64,
    config: StoreConfig,
}

impl<'a, S: StorageAdapter + ?Sized> OverlayStore<'a, S> {
    /// Create an empty overlay over `inner` with default limits.
    pub fn new(inner: &'a mut S) -> Self {
        Self::with_config(inner, StoreConfig::default())
    }

    /// Create an empty overlay over `inner` with custom limits.
    pub fn with_config(inner: &'a mut S, config: StoreConfig) -> Self {
        Self {
            inner,
            writes: BTreeMap::new(),
            total_write_bytes: 0,
            config,
        }
    }

    /// Look up a key in the buffer only.
    pub fn lookup(&self, key: &[u8]) -> OverlayResult {
        match self.writes.get(key) {
            Some(Some(value)) => OverlayResult::Found(value.clone()),
            Some(None) => OverlayResult::Deleted,
            None => OverlayResult::NotInOverlay,
        }
    }

    /// Returns the number of keys touched (written or removed).
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Returns true if nothing has been buffered.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Returns the total bytes buffered (keys + values).
    pub fn total_write_bytes(&self) -> u64 {
        self.total_write_bytes
    }

    /// Apply every buffered write to the backing store, in key order.
    ///
    /// Returns the number of keys applied.
    pub fn commit(self) -> Result<usize, HostError> {
        let count = self.writes.len();
        debug!(keys = count, bytes = self.total_write_bytes, "committing overlay");
        for (key, value) in self.writes {
            match value {
                Some(v) => {
                    self.inner.write(&key, &v)?;
                }
                None => {
                    self.inner.remove(&key)?;
                }
            }
        }
        Ok(count)
    }

    /// Drop every buffered write without touching the backing store.
    pub fn discard(self) {
        debug!(keys = self.writes.len(), "discarding overlay");
    }

    fn record(&mut self, key: &[u8], value: Option<Vec<u8>>) -> Result<(), HostError> {
        // Replace, not accumulate, the bytes of an earlier write to this key
        if let Some(prev) = self.writes.get(key) {
            let prev_bytes = key.len() as u64 + prev.as_ref().map_or(0, |v| v.len() as u64);
            self.total_write_bytes = self.total_write_bytes.saturating_sub(prev_bytes);
        }
        let new_bytes = key.len() as u64 + value.as_ref().map_or(0, |v| v.len() as u64);
        let projected = self.total_write_bytes.saturating_add(new_bytes);
        if projected > self.config.max_write_bytes {
            return Err(HostError::write_limit());
        }
        self.total_write_bytes = projected;
        self.writes.insert(key.to_vec(), value);
        Ok(())
    }
}

impl<S: StorageAdapter + ?Sized> StorageAdapter for OverlayStore<'_, S> {
    fn read(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        match self.lookup(key) {
            OverlayResult::Found(v) => Ok(Some(v)),
            OverlayResult::Deleted => Ok(None),
            OverlayResult::NotInOverlay => self.inner.read(key),
        }
    }

    fn write(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        self.config.check_key(key)?;
        self.config.check_value(value)?;
        let previous = self.read(key)?;
        self.record(key, Some(value.to_vec()))?;
        Ok(previous)
    }

    fn remove(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        self.config.check_key(key)?;
        let previous = self.read(key)?;
        self.record(key, None)?;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem_store::MemStore;

    #[test]
    fn test_reads_fall_through() {
        let mut store = MemStore::new();
        store.insert(b"committed".to_vec(), b"old".to_vec());

        let overlay = OverlayStore::new(&mut store);
        assert_eq!(overlay.lookup(b"committed"), OverlayResult::NotInOverlay);
        assert_eq!(overlay.read(b"committed").unwrap(), Some(b"old".to_vec()));
    }

    #[test]
    fn test_write_shadows_and_reports_previous() {
        let mut store = MemStore::new();
        store.insert(b"key".to_vec(), b"old".to_vec());

        let mut overlay = OverlayStore::new(&mut store);
        assert_eq!(overlay.write(b"key", b"new").unwrap(), Some(b"old".to_vec()));
        assert_eq!(overlay.write(b"key", b"newer").unwrap(), Some(b"new".to_vec()));
        assert_eq!(overlay.read(b"key").unwrap(), Some(b"newer".to_vec()));
    }

    #[test]
    fn test_remove_tombstones_committed_key() {
        let mut store = MemStore::new();
        store.insert(b"key".to_vec(), b"old".to_vec());

        let mut overlay = OverlayStore::new(&mut store);
        assert_eq!(overlay.remove(b"key").unwrap(), Some(b"old".to_vec()));
        assert_eq!(overlay.lookup(b"key"), OverlayResult::Deleted);
        assert_eq!(overlay.read(b"key").unwrap(), None);
        assert_eq!(overlay.remove(b"key").unwrap(), None);
    }

    #[test]
    fn test_commit_applies_writes() {
        let mut store = MemStore::new();
        store.insert(b"gone".to_vec(), b"x".to_vec());

        let mut overlay = OverlayStore::new(&mut store);
        overlay.write(b"a", b"1").unwrap();
        overlay.remove(b"gone").unwrap();
        assert_eq!(overlay.commit().unwrap(), 2);

        assert_eq!(store.read(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.read(b"gone").unwrap(), None);
    }

    #[test]
    fn test_discard_leaves_store_untouched() {
        let mut store = MemStore::new();
        store.insert(b"key".to_vec(), b"old".to_vec());

        let mut overlay = OverlayStore::new(&mut store);
        overlay.write(b"key", b"new").unwrap();
        overlay.write(b"other", b"1").unwrap();
        overlay.discard();

        assert_eq!(store.read(b"key").unwrap(), Some(b"old".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_total_write_bytes() {
        let mut store = MemStore::new();
        let mut overlay = OverlayStore::new(&mut store);
        // "key1" (4) + "value1" (6) = 10
        overlay.write(b"key1", b"value1").unwrap();
        assert_eq!(overlay.total_write_bytes(), 10);

        // Overwrite key1: subtract old (10), add "key1" (4) + "v" (1) = 5
        overlay.write(b"key1", b"v").unwrap();
        assert_eq!(overlay.total_write_bytes(), 5);

        // Removal counts the key only
        overlay.remove(b"key1").unwrap();
        assert_eq!(overlay.total_write_bytes(), 4);
        assert_eq!(overlay.len(), 1);
    }

    #[test]
    fn test_write_limit() {
        let mut store = MemStore::new();
        let config = StoreConfig {
            max_write_bytes: 8,
            ..StoreConfig::default()
        };
        let mut overlay = OverlayStore::with_config(&mut store, config);

        overlay.write(b"ab", b"cd").unwrap();
        assert_eq!(overlay.write(b"ef", b"ghi"), Err(HostError::write_limit()));
        assert_eq!(overlay.total_write_bytes(), 4);
        assert_eq!(overlay.read(b"ef").unwrap(), None);
    }
}
