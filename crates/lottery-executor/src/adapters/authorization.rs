//! Creator allow-list adapters.

use crate::ports::outbound::CreatorAuthorization;
use serde::{Deserialize, Serialize};
use shared_types::{Address, KVStoreError, KeyValueStore};
use std::collections::BTreeSet;
use tracing::{error, warn};

/// State key of the managed creator allow-list.
pub const CREATOR_CONFIG_KEY: &str = "manage/lottery-creator";

/// A managed configuration entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub key: String,
    pub values: Vec<String>,
}

impl ConfigItem {
    /// Creator allow-list entry for `creators`.
    pub fn creators<I, S>(creators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: "lottery-creator".to_string(),
            values: creators.into_iter().map(Into::into).collect(),
        }
    }

    /// Write this entry under [`CREATOR_CONFIG_KEY`].
    pub fn store(&self, state: &mut dyn KeyValueStore) -> Result<(), KVStoreError> {
        let value = serde_json::to_vec(self).map_err(|e| KVStoreError::SerializationError {
            message: e.to_string(),
        })?;
        state.put(CREATOR_CONFIG_KEY.as_bytes(), &value)
    }
}

/// Allow-list read from the managed configuration entry in state.
///
/// A missing entry, an unreadable store or an undecodable value all deny.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManagedAllowList;

impl ManagedAllowList {
    fn load(state: &dyn KeyValueStore) -> Option<ConfigItem> {
        let raw = match state.get(CREATOR_CONFIG_KEY.as_bytes()) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                warn!(key = CREATOR_CONFIG_KEY, "creator allow-list not configured");
                return None;
            }
            Err(e) => {
                error!(key = CREATOR_CONFIG_KEY, error = %e, "creator allow-list unreadable");
                return None;
            }
        };
        match serde_json::from_slice(&raw) {
            Ok(item) => Some(item),
            Err(e) => {
                error!(key = CREATOR_CONFIG_KEY, error = %e, "creator allow-list undecodable");
                None
            }
        }
    }
}

impl CreatorAuthorization for ManagedAllowList {
    fn is_authorized(&self, state: &dyn KeyValueStore, addr: &Address) -> bool {
        Self::load(state)
            .map(|item| item.values.iter().any(|v| v == addr.as_str()))
            .unwrap_or(false)
    }
}

/// Fixed in-process allow-list.
#[derive(Clone, Debug, Default)]
pub struct StaticAllowList {
    creators: BTreeSet<Address>,
}

impl StaticAllowList {
    pub fn new<I: IntoIterator<Item = Address>>(creators: I) -> Self {
        Self {
            creators: creators.into_iter().collect(),
        }
    }
}

impl CreatorAuthorization for StaticAllowList {
    fn is_authorized(&self, _state: &dyn KeyValueStore, addr: &Address) -> bool {
        self.creators.contains(addr)
    }
}
