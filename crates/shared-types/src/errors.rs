//! # Error Types
//!
//! Errors raised by storage adapters and shared by every crate that persists
//! through the `KeyValueStore` port.

use thiserror::Error;

/// Key-value store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// Underlying database I/O failed.
    #[error("I/O error: {message}")]
    IOError { message: String },

    /// A stored value could not be encoded or decoded.
    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    /// A lock guarding the store was poisoned.
    #[error("Store lock poisoned")]
    LockPoisoned,
}
