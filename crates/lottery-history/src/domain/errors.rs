//! # Domain Errors
//!
//! Error types for the history indexer.

use shared_types::KVStoreError;
use thiserror::Error;

/// Errors raised while indexing receipts or answering history queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Buy history is keyed per address.
    #[error("buy history query requires an address")]
    MissingAddress,

    #[error("invalid history config: {0}")]
    InvalidConfig(String),

    /// A lottery receipt log could not be decoded.
    #[error("undecodable lottery receipt: {0}")]
    Receipt(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error(transparent)]
    Store(#[from] KVStoreError),
}

impl From<bincode::Error> for HistoryError {
    fn from(err: bincode::Error) -> Self {
        HistoryError::Codec(err.to_string())
    }
}

/// Result alias for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
