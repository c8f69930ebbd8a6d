//! Persistent growable sequence.
//!
//! A `Vector<T>` owns the storage entries `prefix ++ u32_le(i)` for every
//! `i` in `[0, length)` and nothing else. The struct itself is only the
//! header (length + prefix); it is serialized into whichever record owns it.
//!
//! Invariant: the populated indices are exactly `[0, length)`. A read of an
//! index below `length` that finds nothing is an inconsistent state.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::trace;
use triekit_hostapi::StorageAdapter;

use crate::codec;
use crate::error::{CollectionError, Result};

/// An iterable sequence stored one element per storage entry.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Vector<T> {
    length: u32,
    prefix: String,
    #[serde(skip)]
    marker: PhantomData<fn() -> T>,
}

impl<T> Vector<T> {
    /// Create an empty vector namespaced under `prefix`.
    ///
    /// Two live containers must never share a prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::restore(prefix, 0)
    }

    /// Rebuild a header from persisted parts.
    pub(crate) fn restore(prefix: impl Into<String>, length: u32) -> Self {
        Self {
            prefix: prefix.into(),
            length,
            marker: PhantomData,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of elements.
    pub fn len(&self) -> u32 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    fn key(&self, index: u32) -> Vec<u8> {
        codec::index_to_key(self.prefix.as_bytes(), index)
    }

    fn out_of_bounds(&self, index: u32) -> CollectionError {
        CollectionError::IndexOutOfBounds {
            index,
            len: self.length,
        }
    }

    /// Read the encoded element at `index`, which must be below `length`.
    pub(crate) fn read_slot<S>(&self, store: &S, index: u32) -> Result<Vec<u8>>
    where
        S: StorageAdapter + ?Sized,
    {
        if index >= self.length {
            return Err(self.out_of_bounds(index));
        }
        store.read(&self.key(index))?.ok_or_else(|| {
            CollectionError::inconsistent(format!(
                "vector {:?}: element {} of {} is missing",
                self.prefix, index, self.length
            ))
        })
    }

    pub(crate) fn push_raw<S>(&mut self, store: &mut S, raw: &[u8]) -> Result<()>
    where
        S: StorageAdapter + ?Sized,
    {
        if self.length == u32::MAX {
            return Err(self.out_of_bounds(self.length));
        }
        store.write(&self.key(self.length), raw)?;
        self.length += 1;
        trace!(prefix = %self.prefix, len = self.length, "vector push");
        Ok(())
    }

    /// Remove the last element. Caller guarantees the vector is non-empty.
    fn take_last<S>(&mut self, store: &mut S) -> Result<Vec<u8>>
    where
        S: StorageAdapter + ?Sized,
    {
        let last = self.length - 1;
        let evicted = store.remove(&self.key(last))?;
        self.length = last;
        trace!(prefix = %self.prefix, len = self.length, "vector pop");
        evicted.ok_or_else(|| {
            CollectionError::inconsistent(format!(
                "vector {:?}: element {} was already absent on pop",
                self.prefix, last
            ))
        })
    }

    pub(crate) fn pop_raw<S>(&mut self, store: &mut S) -> Result<Option<Vec<u8>>>
    where
        S: StorageAdapter + ?Sized,
    {
        if self.is_empty() {
            return Ok(None);
        }
        self.take_last(store).map(Some)
    }

    /// Swap-remove without decoding; returns the encoded evicted element.
    pub(crate) fn swap_remove_raw<S>(&mut self, store: &mut S, index: u32) -> Result<Vec<u8>>
    where
        S: StorageAdapter + ?Sized,
    {
        if index >= self.length {
            return Err(self.out_of_bounds(index));
        }
        let last = self.take_last(store)?;
        if index == self.length {
            // The removed element was the last one.
            return Ok(last);
        }
        let evicted = store.write(&self.key(index), &last)?;
        trace!(prefix = %self.prefix, index, "vector swap_remove");
        evicted.ok_or_else(|| {
            CollectionError::inconsistent(format!(
                "vector {:?}: element {} was absent during swap_remove",
                self.prefix, index
            ))
        })
    }

    /// Remove every element and reset the length to zero. O(length).
    pub fn clear<S>(&mut self, store: &mut S) -> Result<()>
    where
        S: StorageAdapter + ?Sized,
    {
        for index in 0..self.length {
            store.remove(&self.key(index))?;
        }
        trace!(prefix = %self.prefix, removed = self.length, "vector clear");
        self.length = 0;
        Ok(())
    }
}

impl<T> Vector<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Element at `index`, or `None` when `index >= len()`.
    pub fn get<S>(&self, store: &S, index: u32) -> Result<Option<T>>
    where
        S: StorageAdapter + ?Sized,
    {
        if index >= self.length {
            return Ok(None);
        }
        let raw = self.read_slot(store, index)?;
        codec::decode_value(&raw).map(Some)
    }

    /// Append an element at position `len()`.
    pub fn push<S>(&mut self, store: &mut S, element: &T) -> Result<()>
    where
        S: StorageAdapter + ?Sized,
    {
        let raw = codec::encode_value(element)?;
        self.push_raw(store, &raw)
    }

    /// Remove and return the last element, or `None` when empty.
    pub fn pop<S>(&mut self, store: &mut S) -> Result<Option<T>>
    where
        S: StorageAdapter + ?Sized,
    {
        match self.pop_raw(store)? {
            Some(raw) => codec::decode_value(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Remove the element at `index` by moving the last element into its slot.
    ///
    /// Returns the element that was at `index`. Does not preserve ordering,
    /// but is O(1).
    pub fn swap_remove<S>(&mut self, store: &mut S, index: u32) -> Result<T>
    where
        S: StorageAdapter + ?Sized,
    {
        let raw = self.swap_remove_raw(store, index)?;
        codec::decode_value(&raw)
    }

    /// Overwrite the element at `index`, returning the previous element.
    pub fn replace<S>(&mut self, store: &mut S, index: u32, element: &T) -> Result<T>
    where
        S: StorageAdapter + ?Sized,
    {
        if index >= self.length {
            return Err(self.out_of_bounds(index));
        }
        let raw = codec::encode_value(element)?;
        let previous = store.write(&self.key(index), &raw)?.ok_or_else(|| {
            CollectionError::inconsistent(format!(
                "vector {:?}: element {} was absent during replace",
                self.prefix, index
            ))
        })?;
        codec::decode_value(&previous)
    }

    /// Push every element in order.
    pub fn extend<S, I>(&mut self, store: &mut S, elements: I) -> Result<()>
    where
        S: StorageAdapter + ?Sized,
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        for element in elements {
            self.push(store, element.borrow())?;
        }
        Ok(())
    }

    /// Lazily iterate over `[0, len())` in index order.
    ///
    /// Each call starts a fresh iterator.
    pub fn iter<'a, S>(&'a self, store: &'a S) -> Iter<'a, T, S>
    where
        S: StorageAdapter + ?Sized,
    {
        Iter {
            vector: self,
            store,
            index: 0,
            failed: false,
        }
    }

    /// Collect every element into a `Vec`.
    pub fn to_vec<S>(&self, store: &S) -> Result<Vec<T>>
    where
        S: StorageAdapter + ?Sized,
    {
        self.iter(store).collect()
    }
}

impl<T> Clone for Vector<T> {
    fn clone(&self) -> Self {
        Self::restore(self.prefix.clone(), self.length)
    }
}

impl<T> PartialEq for Vector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix && self.length == other.length
    }
}

impl<T> Eq for Vector<T> {}

impl<T> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("prefix", &self.prefix)
            .field("length", &self.length)
            .finish()
    }
}

/// Positional iterator over a [`Vector`].
///
/// Stops after yielding the first error.
pub struct Iter<'a, T, S: ?Sized> {
    vector: &'a Vector<T>,
    store: &'a S,
    index: u32,
    failed: bool,
}

impl<T, S> Iterator for Iter<'_, T, S>
where
    T: Serialize + DeserializeOwned,
    S: StorageAdapter + ?Sized,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.index >= self.vector.len() {
            return None;
        }
        match self.vector.get(self.store, self.index) {
            Ok(Some(element)) => {
                self.index += 1;
                Some(Ok(element))
            }
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self.vector.len().saturating_sub(self.index) as usize;
        (0, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triekit_hostapi::MemStore;

    fn abc(store: &mut MemStore) -> Vector<String> {
        let mut vec = Vector::new("v");
        vec.extend(store, ["a", "b", "c"].map(String::from)).unwrap();
        vec
    }

    #[test]
    fn test_push_and_get() {
        let mut store = MemStore::new();
        let vec = abc(&mut store);

        assert_eq!(vec.len(), 3);
        assert!(!vec.is_empty());
        assert_eq!(vec.get(&store, 0).unwrap().as_deref(), Some("a"));
        assert_eq!(vec.get(&store, 2).unwrap().as_deref(), Some("c"));
        assert_eq!(vec.get(&store, 3).unwrap(), None);
    }

    #[test]
    fn test_elements_stored_as_json_under_le_index() {
        let mut store = MemStore::new();
        let _vec = abc(&mut store);

        assert_eq!(
            store.read(b"v\x01\x00\x00\x00").unwrap(),
            Some(b"\"b\"".to_vec())
        );
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_pop() {
        let mut store = MemStore::new();
        let mut vec = abc(&mut store);

        assert_eq!(vec.pop(&mut store).unwrap().as_deref(), Some("c"));
        assert_eq!(vec.len(), 2);
        assert_eq!(store.len(), 2);

        vec.pop(&mut store).unwrap();
        vec.pop(&mut store).unwrap();
        assert_eq!(vec.pop(&mut store).unwrap(), None);
        assert!(vec.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_swap_remove_returns_evicted() {
        let mut store = MemStore::new();
        let mut vec = abc(&mut store);

        assert_eq!(vec.swap_remove(&mut store, 0).unwrap(), "a");
        assert_eq!(vec.len(), 2);
        assert_eq!(vec.get(&store, 0).unwrap().as_deref(), Some("c"));
        assert_eq!(vec.get(&store, 1).unwrap().as_deref(), Some("b"));
        assert_eq!(vec.get(&store, 2).unwrap(), None);
    }

    #[test]
    fn test_swap_remove_last_is_pop() {
        let mut store = MemStore::new();
        let mut vec = abc(&mut store);

        assert_eq!(vec.swap_remove(&mut store, 2).unwrap(), "c");
        assert_eq!(vec.to_vec(&store).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_swap_remove_out_of_bounds() {
        let mut store = MemStore::new();
        let mut vec = abc(&mut store);

        let err = vec.swap_remove(&mut store, 3).unwrap_err();
        assert!(err.is_out_of_bounds());
        assert_eq!(vec.len(), 3);
    }

    #[test]
    fn test_replace() {
        let mut store = MemStore::new();
        let mut vec = abc(&mut store);

        let previous = vec.replace(&mut store, 1, &"B".to_string()).unwrap();
        assert_eq!(previous, "b");
        assert_eq!(vec.to_vec(&store).unwrap(), vec!["a", "B", "c"]);
        assert!(vec.replace(&mut store, 3, &"x".to_string()).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn test_clear_removes_entries() {
        let mut store = MemStore::new();
        let mut vec = abc(&mut store);
        store.insert(b"other".to_vec(), b"1".to_vec());

        vec.clear(&mut store).unwrap();
        assert!(vec.is_empty());
        assert_eq!(store.len(), 1);
        assert_eq!(vec.iter(&store).count(), 0);
    }

    #[test]
    fn test_iter_is_restartable() {
        let mut store = MemStore::new();
        let vec = abc(&mut store);

        let first: Vec<String> = vec.iter(&store).map(|r| r.unwrap()).collect();
        let second: Vec<String> = vec.iter(&store).map(|r| r.unwrap()).collect();
        assert_eq!(first, second);
        assert_eq!(vec.iter(&store).size_hint(), (0, Some(3)));
    }

    #[test]
    fn test_missing_slot_is_inconsistent() {
        let mut store = MemStore::new();
        let vec = abc(&mut store);
        store.remove(b"v\x01\x00\x00\x00").unwrap();

        assert!(vec.get(&store, 1).unwrap_err().is_inconsistent_state());

        let mut iter = vec.iter(&store);
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().unwrap().unwrap_err().is_inconsistent_state());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_pop_of_absent_entry_is_inconsistent() {
        let mut store = MemStore::new();
        let mut vec = abc(&mut store);
        store.remove(b"v\x02\x00\x00\x00").unwrap();

        assert!(vec.pop(&mut store).unwrap_err().is_inconsistent_state());
    }

    #[test]
    fn test_header_serialization() {
        let mut store = MemStore::new();
        let vec = abc(&mut store);

        let json = serde_json::to_string(&vec).unwrap();
        assert_eq!(json, r#"{"length":3,"prefix":"v"}"#);

        let back: Vector<String> = serde_json::from_str(r#"{"length":3,"prefix":"v"}"#).unwrap();
        assert_eq!(back, vec);
        assert_eq!(back.get(&store, 2).unwrap().as_deref(), Some("c"));
    }
}
