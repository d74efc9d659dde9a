//! # Algorithms
//!
//! Pure computations used by the draw: lucky number derivation and round
//! settlement.

pub mod lucky_number;
pub mod reward;

pub use lucky_number::{is_valid_number, lucky_number_from_hash};
pub use reward::{
    settle_round, ticket_reward, Payout, Prize, RoundSettlement, WinningTicket, FACTOR_BASE,
    REWARD_BASE,
};
