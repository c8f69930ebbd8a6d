//! `triekit-hostapi`: the storage seam every triekit collection is built on.
//!
//! The host gives a contract exactly one flat, byte-keyed store with three
//! primitives: read, write and remove, each reporting the previous value.
//! This crate provides:
//!
//! - `StorageAdapter` trait: the read/write/remove contract
//! - `MemStore`: in-memory `StorageAdapter` for tests and the CLI
//! - `OverlayStore`: buffered writes with commit/discard per invocation
//! - `StoreConfig` / `InvocationContext`: store limits and caller environment
//! - `HostError`: host-side error type with `ErrorCode` conversion

pub mod error;
pub mod types;
pub mod storage;
pub mod mem_store;
pub mod overlay;

// Re-export commonly used types at the crate root.
pub use error::{ErrorCode, HostError};
pub use types::{InvocationContext, StoreConfig};
pub use storage::StorageAdapter;
pub use mem_store::{MemStore, Snapshot};
pub use overlay::OverlayStore;
