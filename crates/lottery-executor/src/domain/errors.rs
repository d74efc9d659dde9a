//! # Domain Errors
//!
//! Error types for the lottery executor. Every guard failure is a distinct
//! variant so callers can match on the exact rejection reason; port failures
//! are wrapped unchanged.

use shared_types::{Address, KVStoreError};
use thiserror::Error;

/// Lottery action failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotteryError {
    /// Operator or developer ratio outside `[0, 100]`.
    #[error("Invalid reward ratio: op={op}, dev={dev}, max={max}")]
    InvalidRewardRatio {
        /// Operator ratio requested
        op: u64,
        /// Developer ratio requested
        dev: u64,
        /// Inclusive upper bound
        max: u64,
    },

    /// Caller is not allowed to perform this action.
    #[error("Not authorized: {0}")]
    NotAuthorized(Address),

    /// Purchase window below the configured minimum.
    #[error("Purchase window too short: {got} < {min}")]
    PurchaseWindowTooShort {
        /// Requested window
        got: u64,
        /// Configured minimum
        min: u64,
    },

    /// Draw window below the configured minimum.
    #[error("Draw window too short: {got} < {min}")]
    DrawWindowTooShort {
        /// Requested window
        got: u64,
        /// Configured minimum
        min: u64,
    },

    /// Draw window shorter than the purchase window.
    #[error("Draw window {draw} below purchase window {purchase}")]
    DrawWindowBelowPurchaseWindow {
        /// Requested purchase window
        purchase: u64,
        /// Requested draw window
        draw: u64,
    },

    /// A lottery with this identifier already exists.
    #[error("Duplicate lottery: {0}")]
    DuplicateLottery(String),

    /// No lottery with this identifier.
    #[error("Lottery not found: {0}")]
    NotFound(String),

    /// Action not allowed in the lottery's current phase or timing.
    #[error("Invalid phase: {0}")]
    InvalidPhase(String),

    /// Purchase window has elapsed for the current round.
    #[error("Purchase window expired: elapsed={elapsed}, window={window}")]
    PurchaseWindowExpired {
        /// Heights elapsed since the round opened
        elapsed: u64,
        /// Configured purchase window
        window: u64,
    },

    /// The creator tried to buy into their own lottery.
    #[error("Creator cannot buy")]
    CreatorCannotBuy,

    /// Buy amount must be positive.
    #[error("Invalid amount: {0}")]
    InvalidAmount(u64),

    /// Guessed number outside `[0, 100000)`.
    #[error("Invalid number: {0}")]
    InvalidNumber(u32),

    /// Randomness resolved to an unusable value.
    #[error("Invalid lucky number")]
    InvalidLuckyNumber,

    /// Creator's frozen balance cannot cover the required transfers.
    #[error("Insufficient funds: required={required}, frozen={frozen}")]
    InsufficientFunds {
        /// Minor units about to be transferred
        required: u64,
        /// Minor units currently frozen
        frozen: u64,
    },

    /// Closing lotteries is disabled.
    #[error("Close disabled")]
    CloseDisabled,

    /// Only the creator may close.
    #[error("Close unauthorized: {0}")]
    CloseUnauthorized(Address),

    /// Fixed-point arithmetic overflowed.
    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// Account service failure.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Randomness or height oracle failure.
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// State store failure.
    #[error("Store error: {0}")]
    Store(#[from] KVStoreError),

    /// Record could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(String),
}

/// Ledger failures reported by the account service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// Spendable balance too low.
    #[error("Insufficient balance for {address}: need {need}, have {have}")]
    InsufficientBalance {
        /// Debited account
        address: Address,
        /// Requested amount
        need: u64,
        /// Available amount
        have: u64,
    },

    /// Frozen balance too low.
    #[error("Insufficient frozen balance for {address}: need {need}, have {have}")]
    InsufficientFrozen {
        /// Debited account
        address: Address,
        /// Requested amount
        need: u64,
        /// Available frozen amount
        have: u64,
    },

    /// Balance arithmetic overflowed.
    #[error("Balance overflow for {0}")]
    Overflow(Address),

    /// Account state could not be read or written.
    #[error("Account storage: {0}")]
    Storage(String),
}

/// Randomness and cross-chain height failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The main-chain height for a transaction could not be resolved.
    #[error("Main height unavailable")]
    MainHeightUnavailable,

    /// No randomness is available for the requested window.
    #[error("Randomness unavailable at height {height} ({blocks} blocks)")]
    RandomnessUnavailable {
        /// Reference height
        height: u64,
        /// Sample window
        blocks: u64,
    },

    /// The remote client failed.
    #[error("Remote client: {0}")]
    Remote(String),
}

impl From<bincode::Error> for LotteryError {
    fn from(err: bincode::Error) -> Self {
        LotteryError::Codec(err.to_string())
    }
}

impl From<KVStoreError> for AccountError {
    fn from(err: KVStoreError) -> Self {
        AccountError::Storage(err.to_string())
    }
}

/// Result alias for lottery operations.
pub type LotteryResult<T> = Result<T, LotteryError>;
