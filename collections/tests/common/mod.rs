//! Shared test helpers for collection integration tests.

#![allow(dead_code)]

use triekit_hostapi::{MemStore, StorageAdapter};
use triekit_collections::{UnorderedMap, Vector};

/// A vector with `items` pushed in order.
pub fn vector_of(store: &mut MemStore, prefix: &str, items: &[&str]) -> Vector<String> {
    let mut vec = Vector::new(prefix);
    for item in items {
        vec.push(store, &item.to_string()).unwrap();
    }
    vec
}

/// A map with `pairs` set in order.
pub fn map_of(store: &mut MemStore, prefix: &str, pairs: &[(&str, u32)]) -> UnorderedMap<String, u32> {
    let mut map = UnorderedMap::new(prefix);
    for (k, v) in pairs {
        map.set(store, &k.to_string(), v).unwrap();
    }
    map
}

/// Storage key of element `index` under `prefix`.
pub fn element_key(prefix: &str, index: u32) -> Vec<u8> {
    let mut key = prefix.as_bytes().to_vec();
    key.extend_from_slice(&index.to_le_bytes());
    key
}

/// Storage key of the lookup entry for a string map key.
pub fn lookup_key(prefix: &str, key: &str) -> Vec<u8> {
    format!("{prefix}i\"{key}\"").into_bytes()
}

/// Read a lookup entry as an index.
pub fn read_lookup(store: &MemStore, prefix: &str, key: &str) -> Option<u32> {
    store
        .read(&lookup_key(prefix, key))
        .unwrap()
        .map(|raw| u32::from_le_bytes(raw.try_into().unwrap()))
}
