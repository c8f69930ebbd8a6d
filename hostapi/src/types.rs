//! Store limits and the per-invocation caller environment.

/// Default maximum key length in bytes.
pub const DEFAULT_MAX_KEY_LEN: usize = 2048;

/// Default maximum value length in bytes.
pub const DEFAULT_MAX_VALUE_LEN: usize = 4 * 1024 * 1024; // 4 MiB

/// Default cap on bytes buffered by one invocation.
pub const DEFAULT_MAX_WRITE_BYTES: u64 = 64 * 1024 * 1024; // 64 MiB

/// Limits enforced by the host-side stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum length of a storage key in bytes.
    pub max_key_len: usize,
    /// Maximum length of a storage value in bytes.
    pub max_value_len: usize,
    /// Maximum bytes (keys + values) an `OverlayStore` may buffer.
    pub max_write_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_key_len: DEFAULT_MAX_KEY_LEN,
            max_value_len: DEFAULT_MAX_VALUE_LEN,
            max_write_bytes: DEFAULT_MAX_WRITE_BYTES,
        }
    }
}

impl StoreConfig {
    /// Check a key against the configured limits.
    pub fn check_key(&self, key: &[u8]) -> Result<(), crate::HostError> {
        if key.is_empty() || key.len() > self.max_key_len {
            return Err(crate::HostError::key_too_large());
        }
        Ok(())
    }

    /// Check a value against the configured limits.
    pub fn check_value(&self, value: &[u8]) -> Result<(), crate::HostError> {
        if value.len() > self.max_value_len {
            return Err(crate::HostError::value_too_large());
        }
        Ok(())
    }
}

/// Environment of a single invocation, supplied by the host.
///
/// Identical for every read performed within the same invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvocationContext {
    /// Account that signed the invocation.
    pub signer_account_id: String,
    /// Block timestamp in nanoseconds.
    pub block_timestamp: u64,
}

impl InvocationContext {
    pub fn new(signer_account_id: impl Into<String>, block_timestamp: u64) -> Self {
        Self {
            signer_account_id: signer_account_id.into(),
            block_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = StoreConfig::default();
        assert_eq!(config.max_key_len, 2048);
        assert_eq!(config.max_value_len, 4 * 1024 * 1024);
        assert_eq!(config.max_write_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn test_check_key() {
        let config = StoreConfig {
            max_key_len: 4,
            ..StoreConfig::default()
        };
        assert!(config.check_key(b"abcd").is_ok());
        assert!(config.check_key(b"abcde").is_err());
        assert!(config.check_key(b"").is_err());
    }

    #[test]
    fn test_check_value() {
        let config = StoreConfig {
            max_value_len: 2,
            ..StoreConfig::default()
        };
        assert!(config.check_value(b"").is_ok());
        assert!(config.check_value(b"ab").is_ok());
        assert!(config.check_value(b"abc").is_err());
    }

    #[test]
    fn test_context_new() {
        let ctx = InvocationContext::new("alice.test", 42);
        assert_eq!(ctx.signer_account_id, "alice.test");
        assert_eq!(ctx.block_timestamp, 42);
    }
}
