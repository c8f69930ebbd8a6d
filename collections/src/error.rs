//! Collection error types.

use thiserror::Error;
use tracing::error;
use triekit_hostapi::{ErrorCode, HostError};

/// Message reported for out-of-range positional access.
pub const ERR_INDEX_OUT_OF_BOUNDS: &str = "Index out of bounds";

/// Message reported when persisted state violates a container invariant.
pub const ERR_INCONSISTENT_STATE: &str =
    "The collection is an inconsistent state. Did previous smart contract execution terminate unexpectedly?";

/// Result type alias using CollectionError
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Errors raised by `Vector` and `UnorderedMap` operations.
///
/// None of these are recoverable within the failing invocation.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// Positional access at or past the current length.
    #[error("Index out of bounds: index {index}, length {len}")]
    IndexOutOfBounds { index: u32, len: u32 },

    /// Storage contents disagree with the container's bookkeeping.
    #[error("The collection is an inconsistent state. Did previous smart contract execution terminate unexpectedly? ({0})")]
    InconsistentState(String),

    /// An element or key failed to encode or decode.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The storage adapter refused the operation.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl CollectionError {
    /// Build an `InconsistentState` error and log it.
    pub fn inconsistent(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        error!(%detail, "collection invariant violated");
        Self::InconsistentState(detail)
    }

    /// Returns true for `InconsistentState`.
    pub fn is_inconsistent_state(&self) -> bool {
        matches!(self, Self::InconsistentState(_))
    }

    /// Returns true for `IndexOutOfBounds`.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::IndexOutOfBounds { .. })
    }

    /// The `ErrorCode` reported to external callers.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Codec(_) => ErrorCode::InvalidEncoding,
            Self::Host(err) => err.code(),
            Self::IndexOutOfBounds { .. } | Self::InconsistentState(_) => ErrorCode::Internal,
        }
    }
}
