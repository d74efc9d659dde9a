//! Shared chain fixture.

use lottery_executor::{
    LotteryAction, LotteryBuy, LotteryClose, LotteryCreate, LotteryDraw, LotteryInfo,
};
use lottery_runtime::{LotteryNode, NodeResult, RuntimeConfig};
use shared_types::{Address, Hash, Receipt, TxContext};

pub const COIN: u64 = 100_000_000;
pub const OPERATOR: &str = "operator";
pub const DEVELOPER: &str = "developer";

pub fn block_hash(height: u64) -> Hash {
    let mut hash = [0u8; 32];
    hash[..8].copy_from_slice(&height.wrapping_mul(0x9E37_79B9_7F4A_7C15).to_be_bytes());
    hash[24..].copy_from_slice(&height.to_be_bytes());
    hash
}

/// A node plus a block cursor.
pub struct Chain {
    pub node: LotteryNode,
    pub height: u64,
    next_index: u32,
}

impl Chain {
    /// Node with `creators` allowed and every `(address, coins)` funded.
    pub fn new(creators: &[&str], funded: &[(&str, u64)]) -> Self {
        let mut config = RuntimeConfig {
            creator_allow_list: creators.iter().map(|c| Address::from(*c)).collect(),
            ..RuntimeConfig::default()
        };
        config.lottery.op_reward_addr = Address::from(OPERATOR);
        config.lottery.dev_reward_addr = Address::from(DEVELOPER);

        let mut node = LotteryNode::in_memory(&config).unwrap();
        for (address, coins) in funded {
            node.deposit(&Address::from(*address), coins * COIN).unwrap();
        }
        node.begin_block(0, block_hash(0));
        Self {
            node,
            height: 0,
            next_index: 0,
        }
    }

    /// Commit the current block's history and open the next one.
    pub fn next_block(&mut self) -> Vec<Receipt> {
        let receipts = self.node.commit().unwrap();
        self.height += 1;
        self.next_index = 0;
        self.node.begin_block(self.height, block_hash(self.height));
        receipts
    }

    pub fn advance_to(&mut self, height: u64) {
        while self.height < height {
            self.next_block();
        }
    }

    /// Context of the next transaction in the current block.
    pub fn next_tx(&mut self, from: &str) -> TxContext {
        let index = self.next_index;
        self.next_index += 1;
        let mut tx_hash = [0u8; 32];
        tx_hash[..8].copy_from_slice(&self.height.to_be_bytes());
        tx_hash[8..12].copy_from_slice(&index.to_be_bytes());
        let tag = &from.as_bytes()[..from.len().min(20)];
        tx_hash[12..12 + tag.len()].copy_from_slice(tag);
        self.node.tx_context(
            from,
            self.height,
            index,
            1_700_000_000 + self.height as i64,
            tx_hash,
        )
    }

    pub fn submit(&mut self, from: &str, action: LotteryAction) -> NodeResult<Receipt> {
        let ctx = self.next_tx(from);
        self.node.apply(&ctx, &action)
    }

    /// Create a lottery and return its identifier.
    pub fn create(&mut self, creator: &str, op: u64, dev: u64) -> String {
        let ctx = self.next_tx(creator);
        self.node
            .apply(
                &ctx,
                &LotteryAction::Create(LotteryCreate {
                    purchase_window: 30,
                    draw_window: 40,
                    op_reward_ratio: op,
                    dev_reward_ratio: dev,
                }),
            )
            .unwrap();
        ctx.tx_hash_hex()
    }

    pub fn buy(
        &mut self,
        buyer: &str,
        lottery_id: &str,
        amount: u64,
        number: u32,
        way: u32,
    ) -> NodeResult<Receipt> {
        self.submit(
            buyer,
            LotteryAction::Buy(LotteryBuy {
                lottery_id: lottery_id.to_string(),
                amount,
                number,
                way,
            }),
        )
    }

    pub fn draw(&mut self, creator: &str, lottery_id: &str) -> NodeResult<Receipt> {
        self.submit(
            creator,
            LotteryAction::Draw(LotteryDraw {
                lottery_id: lottery_id.to_string(),
            }),
        )
    }

    pub fn close(&mut self, creator: &str, lottery_id: &str) -> NodeResult<Receipt> {
        self.submit(
            creator,
            LotteryAction::Close(LotteryClose {
                lottery_id: lottery_id.to_string(),
            }),
        )
    }

    pub fn info(&self, lottery_id: &str) -> LotteryInfo {
        self.node.lottery_info(lottery_id).unwrap()
    }

    /// Balance plus frozen, in minor units.
    pub fn holdings(&self, address: &str) -> u64 {
        let account = self.node.balance(&Address::from(address)).unwrap();
        account.balance + account.frozen
    }

    pub fn frozen(&self, address: &str) -> u64 {
        self.node.balance(&Address::from(address)).unwrap().frozen
    }
}

