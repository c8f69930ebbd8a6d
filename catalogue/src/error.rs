//! Catalogue error types.

use thiserror::Error;
use triekit_collections::CollectionError;
use triekit_hostapi::{ErrorCode, HostError};

/// Result type alias using CatalogueError
pub type Result<T> = std::result::Result<T, CatalogueError>;

/// Every way a catalogue invocation can fail.
///
/// All variants abort the invocation; none are retried internally.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// An argument failed a domain check (empty field, out of range, ...).
    #[error("assertion failed: {0}")]
    Validation(String),

    /// No state record under the state key; `init` was never called.
    #[error("Contract state is empty")]
    StateMissing,

    /// The invoked method is not in the method table.
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// Arguments, state record or return value failed to (de)serialize.
    #[error("malformed payload: {0}")]
    Arguments(#[from] serde_json::Error),

    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error(transparent)]
    Host(#[from] HostError),
}

impl CatalogueError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// The `ErrorCode` reported to the caller.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) | Self::UnknownMethod(_) | Self::Arguments(_) => {
                ErrorCode::InvalidArgument
            }
            Self::StateMissing => ErrorCode::Internal,
            Self::Collection(err) => err.code(),
            Self::Host(err) => err.code(),
        }
    }
}
