//! In-memory storage adapter.
//!
//! `MemStore` implements `StorageAdapter` using a `BTreeMap` for
//! deterministic key ordering. Used by unit tests, integration tests and the
//! catalogue CLI, which persists it between runs as a hex snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::storage::StorageAdapter;
use crate::types::StoreConfig;

/// In-memory store backed by `BTreeMap`.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    config: StoreConfig,
}

impl MemStore {
    /// Create a new empty store with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty store with custom limits.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            data: BTreeMap::new(),
            config,
        }
    }

    /// Insert a key-value pair, bypassing limit checks.
    pub fn insert(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.data.insert(key, value);
    }

    /// Returns the number of entries in the store.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.data.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Keys starting with `prefix`, in key order.
    pub fn keys_with_prefix(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        self.data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// The limits this store enforces.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Export every entry as hex.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            entries: self
                .data
                .iter()
                .map(|(k, v)| (hex::encode(k), hex::encode(v)))
                .collect(),
        }
    }

    /// Rebuild a store from a `snapshot()`.
    ///
    /// Returns `ERR_INVALID_ENCODING` if any entry is not valid hex.
    pub fn from_snapshot(snapshot: &Snapshot, config: StoreConfig) -> Result<Self, HostError> {
        let mut data = BTreeMap::new();
        for (k, v) in &snapshot.entries {
            let key = hex::decode(k).map_err(|_| HostError::invalid_encoding())?;
            let value = hex::decode(v).map_err(|_| HostError::invalid_encoding())?;
            data.insert(key, value);
        }
        Ok(Self { data, config })
    }
}

/// Portable image of a `MemStore`, serialized as a JSON object of
/// hex(key) → hex(value).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hex-encoded value stored under a hex-encoded key.
    pub fn get(&self, key_hex: &str) -> Option<&str> {
        self.entries.get(key_hex).map(String::as_str)
    }

    /// Parse the JSON form.
    pub fn from_json(raw: &[u8]) -> Result<Self, HostError> {
        serde_json::from_slice(raw).map_err(|_| HostError::invalid_encoding())
    }

    /// Render the JSON form, one entry per line.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>, HostError> {
        serde_json::to_vec_pretty(self).map_err(|e| HostError::Internal(e.to_string()))
    }
}

impl StorageAdapter for MemStore {
    fn read(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        Ok(self.data.get(key).cloned())
    }

    fn write(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        self.config.check_key(key)?;
        self.config.check_value(value)?;
        Ok(self.data.insert(key.to_vec(), value.to_vec()))
    }

    fn remove(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        self.config.check_key(key)?;
        Ok(self.data.remove(key))
    }

    fn contains(&self, key: &[u8]) -> Result<bool, HostError> {
        Ok(self.data.contains_key(key))
    }
}
