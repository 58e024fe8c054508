//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use std::collections::TryReserveError;
use std::fmt;

use thiserror::Error;

// == Capability ==
/// A caller-supplied hook the engine may need in order to complete an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Sizing hook, required when an aggregate size bound is configured
    Size,
    /// Destroy hook, required whenever a value has to be released
    Destroy,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Size => f.write_str("size"),
            Capability::Destroy => f.write_str("destroy"),
        }
    }
}

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Bad capacity or size bound at creation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Allocation failure during creation or insertion
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    /// Lock acquisition failed (only possible when a lock timeout is configured)
    #[error("Lock failure: {0}")]
    LockFailure(String),

    /// Key is not present in the cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// A value had to be sized or released but no hook was configured
    #[error("Missing capability: no {0} hook configured")]
    MissingCapability(Capability),

    /// A single entry would exceed the aggregate size bound on its own
    #[error("Entry too large: key {key} needs {charge} bytes, bound is {max_size}")]
    EntryTooLarge {
        key: String,
        charge: usize,
        max_size: usize,
    },
}

impl From<TryReserveError> for CacheError {
    fn from(err: TryReserveError) -> Self {
        CacheError::OutOfMemory(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_capability_message() {
        let err = CacheError::MissingCapability(Capability::Destroy);
        assert_eq!(
            err.to_string(),
            "Missing capability: no destroy hook configured"
        );
    }

    #[test]
    fn test_try_reserve_maps_to_out_of_memory() {
        let mut buf: Vec<u8> = Vec::new();
        let err: CacheError = buf.try_reserve(usize::MAX).unwrap_err().into();
        assert!(matches!(err, CacheError::OutOfMemory(_)));
    }
}
