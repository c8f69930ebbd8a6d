//! Persistent associative container.
//!
//! An `UnorderedMap<K, V>` under prefix `p` is made of:
//!
//! ```text
//! keys       Vector<K> at p ++ "k"
//! values     Vector<V> at p ++ "v"
//! lookup     p ++ "i" ++ json(key)  →  u32_le(index)
//! ```
//!
//! `keys[i]` and `values[i]` always describe the same entry, and every live
//! key has exactly one lookup entry pointing at its position. Removal
//! swap-removes from both vectors, repointing the lookup entry of the key
//! that moves into the vacated slot.

use std::borrow::Borrow;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;
use triekit_hostapi::StorageAdapter;

use crate::codec;
use crate::error::{CollectionError, Result};
use crate::vector::{self, Vector};

/// A key-indexed collection with O(1) get, set and remove.
///
/// Iteration order is insertion order until the first removal.
pub struct UnorderedMap<K, V> {
    prefix: String,
    key_index_prefix: String,
    keys: Vector<K>,
    values: Vector<V>,
}

/// Written shape of a map header.
///
/// `length` is always 0: the live count is the length of `keys`/`values`.
#[derive(Serialize)]
#[serde(bound = "", rename_all = "camelCase")]
struct MapHeader<'a, K, V> {
    length: u32,
    prefix: &'a str,
    key_index_prefix: &'a str,
    keys: &'a Vector<K>,
    values: &'a Vector<V>,
}

/// Persisted shape of a map header.
///
/// Only `prefix` and the two lengths are trusted; the derived prefixes are
/// always rebuilt from `prefix`.
#[derive(Deserialize)]
struct MapRecord {
    prefix: String,
    keys: LengthRecord,
    values: LengthRecord,
}

#[derive(Deserialize)]
struct LengthRecord {
    length: u32,
}

impl<K, V> UnorderedMap<K, V> {
    /// Create an empty map namespaced under `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            key_index_prefix: format!("{prefix}i"),
            keys: Vector::new(format!("{prefix}k")),
            values: Vector::new(format!("{prefix}v")),
            prefix,
        }
    }

    fn from_record(record: MapRecord) -> Self {
        let mut map = Self::new(record.prefix);
        map.keys = Vector::restore(map.keys.prefix(), record.keys.length);
        map.values = Vector::restore(map.values.prefix(), record.values.length);
        map
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn key_index_prefix(&self) -> &str {
        &self.key_index_prefix
    }

    /// The positional key vector.
    pub fn keys(&self) -> &Vector<K> {
        &self.keys
    }

    /// The positional value vector.
    pub fn values(&self) -> &Vector<V> {
        &self.values
    }

    /// Number of entries.
    ///
    /// Fails if the key and value vectors disagree on length.
    pub fn len(&self) -> Result<u32> {
        let keys_len = self.keys.len();
        let values_len = self.values.len();
        if keys_len != values_len {
            return Err(CollectionError::inconsistent(format!(
                "map {:?}: {} keys but {} values",
                self.prefix, keys_len, values_len
            )));
        }
        Ok(keys_len)
    }

    pub fn is_empty(&self) -> Result<bool> {
        let keys_empty = self.keys.is_empty();
        if keys_empty != self.values.is_empty() {
            return Err(CollectionError::inconsistent(format!(
                "map {:?}: key and value vectors disagree on emptiness",
                self.prefix
            )));
        }
        Ok(keys_empty)
    }

    fn lookup_key_for_raw(&self, encoded_key: &[u8]) -> Vec<u8> {
        codec::lookup_key_raw(self.key_index_prefix.as_bytes(), encoded_key)
    }

    /// Remove every entry, its lookup entry included.
    pub fn clear<S>(&mut self, store: &mut S) -> Result<()>
    where
        S: StorageAdapter + ?Sized,
    {
        for index in 0..self.keys.len() {
            let encoded_key = self.keys.read_slot(store, index)?;
            store.remove(&self.lookup_key_for_raw(&encoded_key))?;
        }
        self.keys.clear(store)?;
        self.values.clear(store)?;
        trace!(prefix = %self.prefix, "map clear");
        Ok(())
    }
}

impl<K, V> UnorderedMap<K, V>
where
    K: Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    /// Position of `key`, read from the lookup table.
    fn index_of<S>(&self, store: &S, lookup: &[u8]) -> Result<Option<(Vec<u8>, u32)>>
    where
        S: StorageAdapter + ?Sized,
    {
        match store.read(lookup)? {
            Some(raw) => {
                let index = codec::decode_index(&raw)?;
                Ok(Some((raw, index)))
            }
            None => Ok(None),
        }
    }

    /// Value for `key`, or `None` if the key is not present.
    pub fn get<S>(&self, store: &S, key: &K) -> Result<Option<V>>
    where
        S: StorageAdapter + ?Sized,
    {
        let lookup = codec::lookup_key(self.key_index_prefix.as_bytes(), key)?;
        let Some((_, index)) = self.index_of(store, &lookup)? else {
            return Ok(None);
        };
        match self.values.get(store, index)? {
            Some(value) => Ok(Some(value)),
            None => Err(CollectionError::inconsistent(format!(
                "map {:?}: lookup entry points at {} past {} values",
                self.prefix,
                index,
                self.values.len()
            ))),
        }
    }

    pub fn contains_key<S>(&self, store: &S, key: &K) -> Result<bool>
    where
        S: StorageAdapter + ?Sized,
    {
        let lookup = codec::lookup_key(self.key_index_prefix.as_bytes(), key)?;
        Ok(store.contains(&lookup)?)
    }

    /// Insert or overwrite the value for `key`.
    ///
    /// An existing key keeps its position and the old value is returned.
    /// A new key is appended at position `len()`.
    pub fn set<S>(&mut self, store: &mut S, key: &K, value: &V) -> Result<Option<V>>
    where
        S: StorageAdapter + ?Sized,
    {
        let lookup = codec::lookup_key(self.key_index_prefix.as_bytes(), key)?;
        if let Some((_, index)) = self.index_of(store, &lookup)? {
            if index >= self.values.len() {
                return Err(CollectionError::inconsistent(format!(
                    "map {:?}: lookup entry points at {} past {} values",
                    self.prefix,
                    index,
                    self.values.len()
                )));
            }
            return self.values.replace(store, index, value).map(Some);
        }

        let next_index = self.len()?;
        store.write(&lookup, &codec::encode_index(next_index))?;
        self.keys.push(store, key)?;
        self.values.push(store, value)?;
        trace!(prefix = %self.prefix, index = next_index, "map insert");
        Ok(None)
    }

    /// Remove `key`, returning its value. Absent keys are a no-op.
    ///
    /// The last entry moves into the removed slot, so ordering is not
    /// preserved.
    pub fn remove<S>(&mut self, store: &mut S, key: &K) -> Result<Option<V>>
    where
        S: StorageAdapter + ?Sized,
    {
        let encoded_key = codec::encode_value(key)?;
        let lookup = self.lookup_key_for_raw(&encoded_key);
        let Some((raw_index, index)) = self.index_of(store, &lookup)? else {
            return Ok(None);
        };

        let len = self.len()?;
        if index >= len {
            return Err(CollectionError::inconsistent(format!(
                "map {:?}: lookup entry points at {} past {} entries",
                self.prefix, index, len
            )));
        }
        if self.keys.read_slot(store, index)? != encoded_key {
            return Err(CollectionError::inconsistent(format!(
                "map {:?}: lookup entry for removed key points at another key",
                self.prefix
            )));
        }

        if len == 1 {
            store.remove(&lookup)?;
        } else {
            let last_index = len - 1;
            let last_key = self.keys.read_slot(store, last_index)?;

            // Delete before repointing so no two lookup entries share an index.
            store.remove(&lookup)?;
            if index != last_index {
                store.write(&self.lookup_key_for_raw(&last_key), &raw_index)?;
            }
        }

        self.keys.swap_remove_raw(store, index)?;
        let value = self.values.swap_remove(store, index)?;
        trace!(prefix = %self.prefix, index, "map remove");
        Ok(Some(value))
    }

    /// `set` every pair in order; later pairs win.
    pub fn extend<S, I, Q, W>(&mut self, store: &mut S, pairs: I) -> Result<()>
    where
        S: StorageAdapter + ?Sized,
        I: IntoIterator<Item = (Q, W)>,
        Q: Borrow<K>,
        W: Borrow<V>,
    {
        for (key, value) in pairs {
            self.set(store, key.borrow(), value.borrow())?;
        }
        Ok(())
    }

    /// Lazily iterate `(key, value)` pairs in position order.
    pub fn iter<'a, S>(&'a self, store: &'a S) -> Iter<'a, K, V, S>
    where
        S: StorageAdapter + ?Sized,
    {
        Iter {
            keys: self.keys.iter(store),
            values: self.values.iter(store),
            done: false,
        }
    }

    /// Collect every pair into a `Vec`.
    pub fn to_vec<S>(&self, store: &S) -> Result<Vec<(K, V)>>
    where
        S: StorageAdapter + ?Sized,
    {
        self.iter(store).collect()
    }
}

impl<K, V> Serialize for UnorderedMap<K, V> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        MapHeader {
            length: 0,
            prefix: &self.prefix,
            key_index_prefix: &self.key_index_prefix,
            keys: &self.keys,
            values: &self.values,
        }
        .serialize(serializer)
    }
}

impl<'de, K, V> Deserialize<'de> for UnorderedMap<K, V> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        MapRecord::deserialize(deserializer).map(Self::from_record)
    }
}

impl<K, V> Clone for UnorderedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            key_index_prefix: self.key_index_prefix.clone(),
            keys: self.keys.clone(),
            values: self.values.clone(),
        }
    }
}

impl<K, V> PartialEq for UnorderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix && self.keys == other.keys && self.values == other.values
    }
}

impl<K, V> Eq for UnorderedMap<K, V> {}

impl<K, V> fmt::Debug for UnorderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnorderedMap")
            .field("prefix", &self.prefix)
            .field("keys", &self.keys)
            .field("values", &self.values)
            .finish()
    }
}

/// Iterator over `(key, value)` pairs of an [`UnorderedMap`].
///
/// Zips the two positional iterators; if one ends before the other the
/// map is inconsistent and an error is yielded. Stops after the first error.
pub struct Iter<'a, K, V, S: ?Sized> {
    keys: vector::Iter<'a, K, S>,
    values: vector::Iter<'a, V, S>,
    done: bool,
}

impl<K, V, S> Iterator for Iter<'_, K, V, S>
where
    K: Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
    S: StorageAdapter + ?Sized,
{
    type Item = Result<(K, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = match (self.keys.next(), self.values.next()) {
            (None, None) => None,
            (Some(Ok(key)), Some(Ok(value))) => return Some(Ok((key, value))),
            (Some(Err(err)), _) | (_, Some(Err(err))) => Some(Err(err)),
            _ => Some(Err(CollectionError::inconsistent(
                "map keys and values ended at different positions",
            ))),
        };
        self.done = true;
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triekit_hostapi::MemStore;

    fn xyz(store: &mut MemStore) -> UnorderedMap<String, u32> {
        let mut map = UnorderedMap::new("m");
        map.extend(store, [(key("x"), 1u32), (key("y"), 2u32), (key("z"), 3u32)])
            .unwrap();
        map
    }

    fn key(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn test_set_and_get() {
        let mut store = MemStore::new();
        let map = xyz(&mut store);

        assert_eq!(map.len().unwrap(), 3);
        assert_eq!(map.get(&store, &key("x")).unwrap(), Some(1));
        assert_eq!(map.get(&store, &key("z")).unwrap(), Some(3));
        assert_eq!(map.get(&store, &key("w")).unwrap(), None);
        assert!(map.contains_key(&store, &key("y")).unwrap());
        assert!(!map.contains_key(&store, &key("w")).unwrap());
    }

    #[test]
    fn test_storage_layout() {
        let mut store = MemStore::new();
        let _map = xyz(&mut store);

        assert_eq!(store.read(b"mi\"y\"").unwrap(), Some(vec![1, 0, 0, 0]));
        assert_eq!(store.read(b"mk\x01\x00\x00\x00").unwrap(), Some(b"\"y\"".to_vec()));
        assert_eq!(store.read(b"mv\x01\x00\x00\x00").unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.len(), 9);
    }

    #[test]
    fn test_set_existing_keeps_position() {
        let mut store = MemStore::new();
        let mut map = xyz(&mut store);

        assert_eq!(map.set(&mut store, &key("x"), &10).unwrap(), Some(1));
        assert_eq!(map.len().unwrap(), 3);
        let pairs = map.to_vec(&store).unwrap();
        assert_eq!(pairs[0], (key("x"), 10));
    }

    #[test]
    fn test_remove_first_repoints_last() {
        let mut store = MemStore::new();
        let mut map = xyz(&mut store);

        assert_eq!(map.remove(&mut store, &key("x")).unwrap(), Some(1));
        assert_eq!(map.len().unwrap(), 2);
        assert_eq!(map.get(&store, &key("x")).unwrap(), None);
        assert_eq!(map.get(&store, &key("y")).unwrap(), Some(2));
        assert_eq!(map.get(&store, &key("z")).unwrap(), Some(3));

        // "z" moved into slot 0
        assert_eq!(store.read(b"mi\"z\"").unwrap(), Some(vec![0, 0, 0, 0]));
        assert_eq!(store.read(b"mi\"x\"").unwrap(), None);
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn test_remove_last_entry() {
        let mut store = MemStore::new();
        let mut map = xyz(&mut store);

        assert_eq!(map.remove(&mut store, &key("z")).unwrap(), Some(3));
        assert_eq!(map.to_vec(&store).unwrap(), vec![(key("x"), 1), (key("y"), 2)]);
    }

    #[test]
    fn test_remove_only_entry() {
        let mut store = MemStore::new();
        let mut map: UnorderedMap<String, u32> = UnorderedMap::new("m");
        map.set(&mut store, &key("solo"), &7).unwrap();

        assert_eq!(map.remove(&mut store, &key("solo")).unwrap(), Some(7));
        assert!(map.is_empty().unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = MemStore::new();
        let mut map = xyz(&mut store);

        assert_eq!(map.remove(&mut store, &key("w")).unwrap(), None);
        assert_eq!(map.remove(&mut store, &key("w")).unwrap(), None);
        assert_eq!(map.len().unwrap(), 3);
        assert_eq!(store.len(), 9);
    }

    #[test]
    fn test_clear() {
        let mut store = MemStore::new();
        let mut map = xyz(&mut store);

        map.clear(&mut store).unwrap();
        assert!(map.is_empty().unwrap());
        assert!(store.is_empty());
        assert_eq!(map.get(&store, &key("x")).unwrap(), None);
    }

    #[test]
    fn test_len_mismatch_is_inconsistent() {
        let map: UnorderedMap<String, u32> = serde_json::from_str(
            r#"{"prefix":"m","keys":{"prefix":"mk","length":2},"values":{"prefix":"mv","length":1}}"#,
        )
        .unwrap();

        assert!(map.len().unwrap_err().is_inconsistent_state());
        assert!(map.is_empty().is_ok());
    }

    #[test]
    fn test_iter_length_mismatch_is_inconsistent() {
        let mut store = MemStore::new();
        let map = xyz(&mut store);
        let mut json = serde_json::to_value(&map).unwrap();
        json["values"]["length"] = 2.into();
        let broken: UnorderedMap<String, u32> = serde_json::from_value(json).unwrap();

        let items: Vec<_> = broken.iter(&store).collect();
        assert_eq!(items.len(), 3);
        assert!(items[2].as_ref().unwrap_err().is_inconsistent_state());
    }

    #[test]
    fn test_header_serialization_rebuilds_prefixes() {
        let mut store = MemStore::new();
        let map = xyz(&mut store);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(
            json,
            r#"{"length":0,"prefix":"m","keyIndexPrefix":"mi","keys":{"length":3,"prefix":"mk"},"values":{"length":3,"prefix":"mv"}}"#
        );

        // Stale or foreign sub-prefixes in a record are ignored.
        let back: UnorderedMap<String, u32> = serde_json::from_str(
            r#"{"length":0,"prefix":"m","keyIndexPrefix":"zz","keys":{"prefix":"q","length":3},"values":{"prefix":"q","length":3}}"#,
        )
        .unwrap();
        assert_eq!(back, map);
        assert_eq!(back.get(&store, &key("y")).unwrap(), Some(2));
    }
}
