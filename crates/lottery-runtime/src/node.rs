//! # Lottery Node
//!
//! Hosts one executor over a state store and a history store.
//!
//! ## Apply / Commit
//!
//! ```text
//! apply(tx) ──► OverlayStore ──► executor ──Ok──► state.atomic_batch_write
//!                                   │                     │
//!                                   └──Err──► dropped     └──► pending receipts
//!
//! commit() ──► HistoryIndexer::index(pending) ──► history.atomic_batch_write
//! ```
//!
//! Ledger balances live in the state store, so one batch carries the
//! record write and every fund movement of an action.

use crate::config::RuntimeConfig;
use lottery_executor::adapters::{
    BlockHashOracle, BlockingMainChain, ConfigItem, LocalHeightResolver, ManagedAllowList,
    StateLedger,
};
use lottery_executor::{
    AccountBalance, AccountError, AccountService, ExecutorPorts, ExecutorStats, LotteryAction,
    LotteryApi, LotteryError, LotteryExecutor, LotteryInfo, LotteryQuery, MainChainClient,
};
use lottery_history::{
    BuyRecord, DrawRecord, HistoryApi, HistoryError, HistoryIndexer, HistoryQuery, HistoryWriter,
};
use shared_types::{
    Address, Hash, InMemoryKVStore, KVStoreError, KeyValueStore, OverlayStore, Receipt, TxContext,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Lottery(#[from] LotteryError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Store(#[from] KVStoreError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("parachain mode requires a main-chain client")]
    MainChainClientRequired,

    #[error("a main-chain client needs parachain mode")]
    ParachainModeRequired,
}

pub type NodeResult<T> = Result<T, NodeError>;

/// Executor host with all-or-nothing action application.
pub struct LotteryNode {
    executor: LotteryExecutor,
    indexer: HistoryIndexer,
    ledger: Arc<StateLedger>,
    /// Local randomness source; `None` when anchored to a main chain.
    blocks: Option<Arc<BlockHashOracle>>,
    state: Box<dyn KeyValueStore>,
    history: Box<dyn KeyValueStore>,
    exec_address: Address,
    /// Receipts applied since the last commit.
    pending: Vec<Receipt>,
}

impl LotteryNode {
    /// Main-chain node drawing randomness from recorded block hashes.
    pub fn new(
        config: &RuntimeConfig,
        state: Box<dyn KeyValueStore>,
        history: Box<dyn KeyValueStore>,
    ) -> NodeResult<Self> {
        if config.lottery.is_parachain() {
            return Err(NodeError::MainChainClientRequired);
        }
        let ledger = Arc::new(StateLedger::new());
        let blocks = Arc::new(BlockHashOracle::new());
        let ports = ExecutorPorts {
            ledger: ledger.clone(),
            oracle: blocks.clone(),
            heights: Arc::new(LocalHeightResolver),
            authorization: Arc::new(ManagedAllowList),
        };
        Self::assemble(config, ports, ledger, Some(blocks), state, history)
    }

    /// Parachain node resolving heights and randomness through `client`.
    pub fn with_main_chain<C: MainChainClient + 'static>(
        config: &RuntimeConfig,
        client: Arc<C>,
        state: Box<dyn KeyValueStore>,
        history: Box<dyn KeyValueStore>,
    ) -> NodeResult<Self> {
        if !config.lottery.is_parachain() {
            return Err(NodeError::ParachainModeRequired);
        }
        let ledger = Arc::new(StateLedger::new());
        let bridge = Arc::new(BlockingMainChain::new(client).map_err(LotteryError::from)?);
        let ports = ExecutorPorts {
            ledger: ledger.clone(),
            oracle: bridge.clone(),
            heights: bridge,
            authorization: Arc::new(ManagedAllowList),
        };
        Self::assemble(config, ports, ledger, None, state, history)
    }

    /// Main-chain node over in-memory stores.
    pub fn in_memory(config: &RuntimeConfig) -> NodeResult<Self> {
        Self::new(
            config,
            Box::new(InMemoryKVStore::new()),
            Box::new(InMemoryKVStore::new()),
        )
    }

    fn assemble(
        config: &RuntimeConfig,
        ports: ExecutorPorts,
        ledger: Arc<StateLedger>,
        blocks: Option<Arc<BlockHashOracle>>,
        mut state: Box<dyn KeyValueStore>,
        history: Box<dyn KeyValueStore>,
    ) -> NodeResult<Self> {
        config
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;

        if !config.creator_allow_list.is_empty() {
            ConfigItem::creators(config.creator_allow_list.iter().map(|a| a.as_str()))
                .store(state.as_mut())?;
            info!(
                creators = config.creator_allow_list.len(),
                "seeded creator allow-list"
            );
        }

        Ok(Self {
            executor: LotteryExecutor::new(config.lottery.clone(), ports),
            indexer: HistoryIndexer::new(config.history),
            ledger,
            blocks,
            state,
            history,
            exec_address: config.exec_address.clone(),
            pending: Vec::new(),
        })
    }

    pub fn exec_address(&self) -> &Address {
        &self.exec_address
    }

    /// Minor units per coin.
    pub fn coin_precision(&self) -> u64 {
        self.executor.config().coin_precision
    }

    pub fn stats(&self) -> ExecutorStats {
        self.executor.stats()
    }

    pub fn state(&self) -> &dyn KeyValueStore {
        self.state.as_ref()
    }

    /// Context for a transaction executed by this node.
    pub fn tx_context(
        &self,
        from: impl Into<Address>,
        height: u64,
        index: u32,
        block_time: i64,
        tx_hash: Hash,
    ) -> TxContext {
        TxContext {
            tx_hash,
            from: from.into(),
            height,
            index,
            block_time,
            exec_address: self.exec_address.clone(),
        }
    }

    /// Make a block's hash available to later draws.
    pub fn begin_block(&self, height: u64, hash: Hash) {
        if let Some(blocks) = &self.blocks {
            blocks.record_block(height, hash);
        }
    }

    /// Credit `amount` minor units to `address` in the lottery's scope.
    pub fn deposit(&mut self, address: &Address, amount: u64) -> NodeResult<()> {
        let mut overlay = OverlayStore::new(self.state.as_ref());
        self.ledger
            .deposit(&mut overlay, address, &self.exec_address, amount)?;
        let batch = overlay.into_batch();
        self.state.atomic_batch_write(batch)?;
        Ok(())
    }

    pub fn balance(&self, address: &Address) -> NodeResult<AccountBalance> {
        Ok(self
            .ledger
            .load_account(self.state.as_ref(), address, &self.exec_address)?)
    }

    /// Execute one action. On error nothing is written.
    pub fn apply(&mut self, ctx: &TxContext, action: &LotteryAction) -> NodeResult<Receipt> {
        let (result, batch) = {
            let mut overlay = OverlayStore::new(self.state.as_ref());
            let result = self.executor.execute(&mut overlay, ctx, action);
            (result, overlay.into_batch())
        };

        match result {
            Ok(receipt) => {
                let writes = batch.len();
                self.state.atomic_batch_write(batch)?;
                debug!(
                    action = action.name(),
                    height = ctx.height,
                    index = ctx.index,
                    writes,
                    "action committed"
                );
                self.pending.push(receipt.clone());
                Ok(receipt)
            }
            Err(e) => {
                warn!(
                    action = action.name(),
                    height = ctx.height,
                    index = ctx.index,
                    error = %e,
                    "action rejected"
                );
                Err(e.into())
            }
        }
    }

    /// Index every receipt applied since the last commit.
    pub fn commit(&mut self) -> NodeResult<Vec<Receipt>> {
        let mut ops = Vec::new();
        for receipt in &self.pending {
            ops.extend(self.indexer.index(receipt)?);
        }
        let entries = ops.len();
        self.history.atomic_batch_write(ops)?;
        let receipts = std::mem::take(&mut self.pending);
        debug!(receipts = receipts.len(), entries, "history committed");
        Ok(receipts)
    }

    /// Undo the history entries of previously committed receipts.
    pub fn revert(&mut self, receipts: &[Receipt]) -> NodeResult<()> {
        let mut ops = Vec::new();
        for receipt in receipts.iter().rev() {
            ops.extend(self.indexer.revert(receipt)?);
        }
        info!(entries = ops.len(), "reverting history");
        self.history.atomic_batch_write(ops)?;
        Ok(())
    }

    /// Read access to the history indices.
    pub fn history(&self) -> HistoryView<'_> {
        HistoryView {
            indexer: &self.indexer,
            store: self.history.as_ref(),
        }
    }

    pub fn lottery_info(&self, lottery_id: &str) -> NodeResult<LotteryInfo> {
        Ok(self.executor.lottery_info(self.state.as_ref(), lottery_id)?)
    }

    pub fn purchase_addresses(&self, lottery_id: &str) -> NodeResult<Vec<Address>> {
        Ok(self
            .executor
            .purchase_addresses(self.state.as_ref(), lottery_id)?)
    }
}

/// History queries bound to the node's history store.
pub struct HistoryView<'a> {
    indexer: &'a HistoryIndexer,
    store: &'a dyn KeyValueStore,
}

impl HistoryView<'_> {
    pub fn list_draws(&self, query: &HistoryQuery) -> NodeResult<Vec<DrawRecord>> {
        Ok(self.indexer.list_draws(self.store, query)?)
    }

    pub fn list_buys(&self, query: &HistoryQuery) -> NodeResult<Vec<BuyRecord>> {
        Ok(self.indexer.list_buys(self.store, query)?)
    }

    pub fn round_lucky_numbers(
        &self,
        lottery_id: &str,
        rounds: &[u64],
    ) -> NodeResult<Vec<DrawRecord>> {
        Ok(self
            .indexer
            .round_lucky_numbers(self.store, lottery_id, rounds)?)
    }

    pub fn buys_in_round(
        &self,
        lottery_id: &str,
        address: &Address,
        round: u64,
    ) -> NodeResult<Vec<BuyRecord>> {
        Ok(self
            .indexer
            .buys_in_round(self.store, lottery_id, address, round)?)
    }
}
