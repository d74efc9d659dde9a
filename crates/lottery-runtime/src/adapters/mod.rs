//! # Adapters
//!
//! Storage backends for the node.

#[cfg(feature = "rocksdb")]
mod rocksdb_store;

#[cfg(feature = "rocksdb")]
pub use rocksdb_store::{RocksDbConfig, RocksDbStore};
