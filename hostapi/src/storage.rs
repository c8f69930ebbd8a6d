//! Storage primitive abstraction.
//!
//! `StorageAdapter` is the whole contract the collections rely on: a single
//! flat byte-keyed store with no ordering, no range scans and no batch
//! operations. Every mutating primitive reports the value it displaced so
//! callers can detect divergence between their bookkeeping and storage.
//!
//! Implementations:
//! - `MemStore` (this crate): in-memory BTreeMap
//! - `OverlayStore` (this crate): buffered writes over another adapter

use crate::error::HostError;

/// The host's key-value storage primitives.
///
/// Operations are run-to-completion; the host serializes invocations so
/// implementations need no internal synchronization.
pub trait StorageAdapter {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn read(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError>;

    /// Store `value` under `key`, returning the value it replaced.
    fn write(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>, HostError>;

    /// Delete `key`, returning the value it held.
    fn remove(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError>;

    /// Check if a key exists.
    ///
    /// Default implementation uses `read()`, but backends may optimize this.
    fn contains(&self, key: &[u8]) -> Result<bool, HostError> {
        Ok(self.read(key)?.is_some())
    }
}

impl<S: StorageAdapter + ?Sized> StorageAdapter for &mut S {
    fn read(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        (**self).remove(key)
    }

    fn contains(&self, key: &[u8]) -> Result<bool, HostError> {
        (**self).contains(key)
    }
}
