//! # Key-Value Store Port
//!
//! Ordered byte-keyed storage shared by the executor (state) and the history
//! indexer (local indices).
//!
//! ## Atomicity
//!
//! Actions never write straight into the backing store. They run against an
//! [`OverlayStore`] whose buffered writes are turned into a single
//! [`BatchOperation`] list and applied with `atomic_batch_write` only after
//! the action succeeded. Dropping the overlay discards everything.

use crate::errors::KVStoreError;
use std::collections::BTreeMap;

/// Iteration order for range listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ListDirection {
    /// Largest key first.
    #[default]
    Descending = 0,
    /// Smallest key first.
    Ascending = 1,
}

/// Abstract interface for ordered key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch are applied, or NONE are.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// All entries under `prefix`, sorted by key ascending.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError>;

    /// Up to `count` values under `prefix` in `direction` order.
    ///
    /// With `start_after = Some(cursor)` the listing resumes strictly after
    /// the cursor key in the iteration direction; the cursor itself is never
    /// returned.
    fn list(
        &self,
        prefix: &[u8],
        start_after: Option<&[u8]>,
        count: usize,
        direction: ListDirection,
    ) -> Result<Vec<Vec<u8>>, KVStoreError> {
        let mut entries = self.prefix_scan(prefix)?;
        if direction == ListDirection::Descending {
            entries.reverse();
        }
        let values = entries
            .into_iter()
            .filter(|(key, _)| match (start_after, direction) {
                (None, _) => true,
                (Some(cursor), ListDirection::Ascending) => key.as_slice() > cursor,
                (Some(cursor), ListDirection::Descending) => key.as_slice() < cursor,
            })
            .take(count)
            .map(|(_, value)| value)
            .collect();
        Ok(values)
    }
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }

    /// The key this operation touches.
    pub fn key(&self) -> &[u8] {
        match self {
            BatchOperation::Put { key, .. } | BatchOperation::Delete { key } => key,
        }
    }
}

/// In-memory ordered store for tests and the default runtime.
#[derive(Debug, Default, Clone)]
pub struct InMemoryKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.data.remove(key);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    self.data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    self.data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        Ok(self
            .data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// Write buffer layered over a read-only base store.
///
/// Reads see buffered writes first. Nothing reaches the base until the
/// caller takes [`OverlayStore::into_batch`] and commits it.
pub struct OverlayStore<'a> {
    base: &'a dyn KeyValueStore,
    /// `None` marks a buffered delete.
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> OverlayStore<'a> {
    pub fn new(base: &'a dyn KeyValueStore) -> Self {
        Self {
            base,
            pending: BTreeMap::new(),
        }
    }

    /// Number of keys touched so far.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Consume the overlay, yielding its writes in key order.
    pub fn into_batch(self) -> Vec<BatchOperation> {
        self.pending
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => BatchOperation::Put { key, value },
                None => BatchOperation::Delete { key },
            })
            .collect()
    }
}

impl KeyValueStore for OverlayStore<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        match self.pending.get(key) {
            Some(buffered) => Ok(buffered.clone()),
            None => self.base.get(key),
        }
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.pending.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.pending.insert(key.to_vec(), None);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    self.pending.insert(key, Some(value));
                }
                BatchOperation::Delete { key } => {
                    self.pending.insert(key, None);
                }
            }
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = self.base.prefix_scan(prefix)?.into_iter().collect();
        for (key, value) in self
            .pending
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}
