//! Storage key and value encoding.
//!
//! Layout (bit-exact, shared with data already persisted in this shape):
//!
//! ```text
//! element     prefix ++ u32_le(index)            → json(element)
//! lookup      key_index_prefix ++ json(key)      → u32_le(index)
//! ```
//!
//! Element indices are binary, map keys are textual. Both halves must stay
//! as they are to read existing state.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CollectionError, Result};

/// Width of an encoded element index.
pub const INDEX_LEN: usize = 4;

/// Encode an element index as 4 little-endian bytes.
pub fn encode_index(index: u32) -> [u8; INDEX_LEN] {
    index.to_le_bytes()
}

/// Decode a lookup-table entry back into an index.
///
/// Anything other than exactly 4 bytes means the lookup table was written
/// by something else, so it is reported as an inconsistent state.
pub fn decode_index(raw: &[u8]) -> Result<u32> {
    let bytes: [u8; INDEX_LEN] = raw.try_into().map_err(|_| {
        CollectionError::inconsistent(format!(
            "lookup entry holds {} bytes, expected {}",
            raw.len(),
            INDEX_LEN
        ))
    })?;
    Ok(u32::from_le_bytes(bytes))
}

/// Storage key of the element at `index`: `prefix ++ u32_le(index)`.
pub fn index_to_key(prefix: &[u8], index: u32) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + INDEX_LEN);
    key.extend_from_slice(prefix);
    key.extend_from_slice(&encode_index(index));
    key
}

/// Storage key of a lookup entry for an already-encoded map key.
pub fn lookup_key_raw(key_index_prefix: &[u8], encoded_key: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(key_index_prefix.len() + encoded_key.len());
    key.extend_from_slice(key_index_prefix);
    key.extend_from_slice(encoded_key);
    key
}

/// Storage key of the lookup entry for `key`: `key_index_prefix ++ json(key)`.
pub fn lookup_key<K: Serialize + ?Sized>(key_index_prefix: &[u8], key: &K) -> Result<Vec<u8>> {
    Ok(lookup_key_raw(key_index_prefix, &encode_value(key)?))
}

/// JSON-encode a stored element or map key.
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Decode a stored element.
pub fn decode_value<T: DeserializeOwned>(raw: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(raw)?)
}
