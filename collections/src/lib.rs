//! `triekit-collections`: persistent collections over a flat key-value store.
//!
//! The host exposes a single byte-keyed store with read/write/remove and
//! nothing else: no ordering, no range scans, no multi-key deletes. This
//! crate layers two reusable containers on top of it:
//!
//! - [`Vector`]: a densely indexed sequence, one storage entry per element
//!   at `prefix ++ u32_le(index)`, with O(1) swap-remove
//! - [`UnorderedMap`]: parallel key/value vectors plus a lookup table at
//!   `prefix ++ "i" ++ json(key)` holding each key's 4-byte LE index
//!
//! Containers hold only their prefix and length; every operation takes the
//! [`StorageAdapter`](triekit_hostapi::StorageAdapter) explicitly. The small
//! header (`{"prefix", "length"}`) is persisted by the owning record via
//! serde, exactly where the record itself lives.
//!
//! Any observed violation of a container invariant is reported as
//! [`CollectionError::InconsistentState`] and never repaired in place.

pub mod error;
pub mod codec;
pub mod vector;
pub mod unordered_map;

pub use error::{CollectionError, Result};
pub use vector::Vector;
pub use unordered_map::UnorderedMap;
