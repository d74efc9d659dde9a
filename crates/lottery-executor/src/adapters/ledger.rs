//! State-backed account ledger.
//!
//! Implements `AccountService` by keeping each execution-scoped account as a
//! bincode value at `account/<exec>/<addr>` in the same state store as the
//! lottery records. Writes therefore share the action's overlay and commit or
//! vanish together with the record.

use crate::domain::AccountError;
use crate::ports::outbound::{AccountBalance, AccountService};
use serde::{Deserialize, Serialize};
use shared_types::{Address, KeyValue, KeyValueStore, Receipt, ReceiptLog};
use tracing::{debug, warn};

/// Log type of a spendable-balance change.
pub const TY_LOG_EXEC_TRANSFER: u32 = 5;

/// Log type of a frozen-balance change.
pub const TY_LOG_EXEC_FROZEN: u32 = 8;

/// Payload of a ledger receipt log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDelta {
    pub address: Address,
    pub exec: Address,
    pub prev: AccountBalance,
    pub current: AccountBalance,
}

/// Account ledger stored in the state store.
#[derive(Clone, Debug, Default)]
pub struct StateLedger;

impl StateLedger {
    pub fn new() -> Self {
        Self
    }

    /// Storage key of an execution-scoped account.
    pub fn account_key(addr: &Address, exec: &Address) -> Vec<u8> {
        format!("account/{}/{}", exec, addr).into_bytes()
    }

    fn load(
        &self,
        state: &dyn KeyValueStore,
        addr: &Address,
        exec: &Address,
    ) -> Result<AccountBalance, AccountError> {
        match state.get(&Self::account_key(addr, exec))? {
            Some(bytes) => {
                bincode::deserialize(&bytes).map_err(|e| AccountError::Storage(e.to_string()))
            }
            None => Ok(AccountBalance::default()),
        }
    }

    fn encode(balance: &AccountBalance) -> Result<Vec<u8>, AccountError> {
        bincode::serialize(balance).map_err(|e| AccountError::Storage(e.to_string()))
    }

    /// Write every changed account and describe the writes in a receipt.
    /// All values are encoded before the first write.
    fn commit(
        &self,
        state: &mut dyn KeyValueStore,
        exec: &Address,
        ty: u32,
        changes: Vec<(Address, AccountBalance, AccountBalance)>,
    ) -> Result<Receipt, AccountError> {
        let mut encoded = Vec::with_capacity(changes.len());
        for (address, prev, current) in changes {
            let value = Self::encode(&current)?;
            let delta = AccountDelta {
                address: address.clone(),
                exec: exec.clone(),
                prev,
                current,
            };
            let log = bincode::serialize(&delta).map_err(|e| AccountError::Storage(e.to_string()))?;
            encoded.push((Self::account_key(&address, exec), value, log));
        }

        let mut receipt = Receipt::default();
        for (key, value, log) in encoded {
            state.put(&key, &value)?;
            receipt.kv.push(KeyValue::new(key, value));
            receipt.logs.push(ReceiptLog { ty, log });
        }
        Ok(receipt)
    }

    /// Credit spendable balance. Used to fund accounts from outside the
    /// lottery (genesis, tests).
    pub fn deposit(
        &self,
        state: &mut dyn KeyValueStore,
        addr: &Address,
        exec: &Address,
        amount: u64,
    ) -> Result<Receipt, AccountError> {
        let prev = self.load(state, addr, exec)?;
        let current = AccountBalance {
            balance: prev
                .balance
                .checked_add(amount)
                .ok_or_else(|| AccountError::Overflow(addr.clone()))?,
            ..prev
        };
        self.commit(state, exec, TY_LOG_EXEC_TRANSFER, vec![(addr.clone(), prev, current)])
    }

    /// Move value between two accounts: `take` debits the source, `give`
    /// credits the target. Handles `from == to` by applying both to one
    /// balance.
    #[allow(clippy::too_many_arguments)]
    fn move_between(
        &self,
        state: &mut dyn KeyValueStore,
        from: &Address,
        to: &Address,
        exec: &Address,
        ty: u32,
        take: impl Fn(&AccountBalance) -> Result<AccountBalance, AccountError>,
        give: impl Fn(&AccountBalance) -> Result<AccountBalance, AccountError>,
    ) -> Result<Receipt, AccountError> {
        let from_prev = self.load(state, from, exec)?;
        if from == to {
            let current = give(&take(&from_prev)?)?;
            return self.commit(state, exec, ty, vec![(from.clone(), from_prev, current)]);
        }
        let to_prev = self.load(state, to, exec)?;
        let from_current = take(&from_prev)?;
        let to_current = give(&to_prev)?;
        self.commit(
            state,
            exec,
            ty,
            vec![
                (from.clone(), from_prev, from_current),
                (to.clone(), to_prev, to_current),
            ],
        )
    }
}

impl AccountService for StateLedger {
    fn transfer(
        &self,
        state: &mut dyn KeyValueStore,
        from: &Address,
        to: &Address,
        exec: &Address,
        amount: u64,
    ) -> Result<Receipt, AccountError> {
        debug!(%from, %to, %exec, amount, "ledger transfer");
        self.move_between(
            state,
            from,
            to,
            exec,
            TY_LOG_EXEC_TRANSFER,
            |acc| {
                let balance = acc.balance.checked_sub(amount).ok_or_else(|| {
                    warn!(address = %from, need = amount, have = acc.balance, "insufficient balance");
                    AccountError::InsufficientBalance {
                        address: from.clone(),
                        need: amount,
                        have: acc.balance,
                    }
                })?;
                Ok(AccountBalance { balance, ..*acc })
            },
            |acc| {
                let balance = acc
                    .balance
                    .checked_add(amount)
                    .ok_or_else(|| AccountError::Overflow(to.clone()))?;
                Ok(AccountBalance { balance, ..*acc })
            },
        )
    }

    fn freeze(
        &self,
        state: &mut dyn KeyValueStore,
        addr: &Address,
        exec: &Address,
        amount: u64,
    ) -> Result<Receipt, AccountError> {
        debug!(%addr, %exec, amount, "ledger freeze");
        let prev = self.load(state, addr, exec)?;
        let balance = prev
            .balance
            .checked_sub(amount)
            .ok_or_else(|| AccountError::InsufficientBalance {
                address: addr.clone(),
                need: amount,
                have: prev.balance,
            })?;
        let frozen = prev
            .frozen
            .checked_add(amount)
            .ok_or_else(|| AccountError::Overflow(addr.clone()))?;
        let current = AccountBalance { balance, frozen };
        self.commit(state, exec, TY_LOG_EXEC_FROZEN, vec![(addr.clone(), prev, current)])
    }

    fn transfer_frozen(
        &self,
        state: &mut dyn KeyValueStore,
        from: &Address,
        to: &Address,
        exec: &Address,
        amount: u64,
    ) -> Result<Receipt, AccountError> {
        debug!(%from, %to, %exec, amount, "ledger transfer from frozen");
        self.move_between(
            state,
            from,
            to,
            exec,
            TY_LOG_EXEC_TRANSFER,
            |acc| {
                let frozen = acc.frozen.checked_sub(amount).ok_or_else(|| {
                    AccountError::InsufficientFrozen {
                        address: from.clone(),
                        need: amount,
                        have: acc.frozen,
                    }
                })?;
                Ok(AccountBalance { frozen, ..*acc })
            },
            |acc| {
                let balance = acc
                    .balance
                    .checked_add(amount)
                    .ok_or_else(|| AccountError::Overflow(to.clone()))?;
                Ok(AccountBalance { balance, ..*acc })
            },
        )
    }

    fn load_account(
        &self,
        state: &dyn KeyValueStore,
        addr: &Address,
        exec: &Address,
    ) -> Result<AccountBalance, AccountError> {
        self.load(state, addr, exec)
    }
}
