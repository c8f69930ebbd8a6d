//! Host-side error types.
//!
//! `ErrorCode` is the numeric code reported across the invocation boundary.
//! `HostError` is what a `StorageAdapter` returns when the host refuses an
//! operation; it wraps an `ErrorCode` or carries an internal message.

use std::fmt;

/// Numeric error codes reported to external callers.
///
/// These repr values are part of the CLI/runtime contract and must not move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    KeyTooLarge = 1,
    ValueTooLarge = 2,
    WriteLimit = 3,
    InvalidEncoding = 4,
    Internal = 5,
    InvalidArgument = 6,
}

impl ErrorCode {
    /// Convert from an i32 error code.
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::KeyTooLarge),
            2 => Some(Self::ValueTooLarge),
            3 => Some(Self::WriteLimit),
            4 => Some(Self::InvalidEncoding),
            5 => Some(Self::Internal),
            6 => Some(Self::InvalidArgument),
            _ => None,
        }
    }

    /// Return the i32 representation of this error code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns true if this is the `Ok` variant.
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::KeyTooLarge => write!(f, "ERR_KEY_TOO_LARGE"),
            Self::ValueTooLarge => write!(f, "ERR_VALUE_TOO_LARGE"),
            Self::WriteLimit => write!(f, "ERR_WRITE_LIMIT"),
            Self::InvalidEncoding => write!(f, "ERR_INVALID_ENCODING"),
            Self::Internal => write!(f, "ERR_INTERNAL"),
            Self::InvalidArgument => write!(f, "ERR_INVALID_ARGUMENT"),
        }
    }
}

/// Error returned by `StorageAdapter` implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// A host-defined error code.
    #[error("host error: {0}")]
    Code(ErrorCode),
    /// An internal host failure with no dedicated code.
    /// Reported to callers as `ERR_INTERNAL`.
    #[error("internal host error: {0}")]
    Internal(String),
}

impl HostError {
    /// Convert to the `i32` error code reported to callers.
    pub fn to_error_code(&self) -> i32 {
        self.code().as_i32()
    }

    /// The `ErrorCode` this error is reported as.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Code(code) => *code,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Create a key-too-large error. Also used for empty keys.
    pub fn key_too_large() -> Self {
        Self::Code(ErrorCode::KeyTooLarge)
    }

    /// Create a value-too-large error.
    pub fn value_too_large() -> Self {
        Self::Code(ErrorCode::ValueTooLarge)
    }

    /// Create a write-limit error.
    pub fn write_limit() -> Self {
        Self::Code(ErrorCode::WriteLimit)
    }

    /// Create an invalid-encoding error.
    pub fn invalid_encoding() -> Self {
        Self::Code(ErrorCode::InvalidEncoding)
    }
}

impl From<ErrorCode> for HostError {
    fn from(code: ErrorCode) -> Self {
        Self::Code(code)
    }
}
