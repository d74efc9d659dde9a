//! # Value Objects
//!
//! Query parameters and page-size configuration.

use super::errors::{HistoryError, HistoryResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, ListDirection};

/// Page-size configuration for history listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Page size when the request asks for zero entries (default: 20).
    pub default_count: usize,
    /// Hard upper bound on a page (default: 100).
    pub max_count: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_count: 20,
            max_count: 100,
        }
    }
}

impl HistoryConfig {
    pub fn validate(&self) -> HistoryResult<()> {
        if self.max_count == 0 {
            return Err(HistoryError::InvalidConfig("max_count is zero".into()));
        }
        if self.default_count == 0 || self.default_count > self.max_count {
            return Err(HistoryError::InvalidConfig(format!(
                "default_count {} outside 1..={}",
                self.default_count, self.max_count
            )));
        }
        Ok(())
    }

    /// Effective page size for a requested count.
    pub fn page_size(&self, requested: usize) -> usize {
        match requested {
            0 => self.default_count,
            n => n.min(self.max_count),
        }
    }
}

/// A paginated history request.
///
/// `round == 0` starts from the end selected by `direction`; otherwise the
/// listing resumes after the `(round, index)` cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryQuery {
    pub lottery_id: String,
    /// Required for buy history.
    pub address: Option<Address>,
    pub round: u64,
    /// Ticket sequence index inside `round`; buy history only.
    pub index: Option<u64>,
    pub count: usize,
    pub direction: ListDirection,
}

impl HistoryQuery {
    pub fn draws(lottery_id: impl Into<String>) -> Self {
        Self {
            lottery_id: lottery_id.into(),
            ..Default::default()
        }
    }

    pub fn buys(lottery_id: impl Into<String>, address: impl Into<Address>) -> Self {
        Self {
            lottery_id: lottery_id.into(),
            address: Some(address.into()),
            ..Default::default()
        }
    }

    /// Resume after `round` (and `index` for buys).
    pub fn after(mut self, round: u64, index: Option<u64>) -> Self {
        self.round = round;
        self.index = index;
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_direction(mut self, direction: ListDirection) -> Self {
        self.direction = direction;
        self
    }
}
