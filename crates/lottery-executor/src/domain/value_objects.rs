//! # Value Objects
//!
//! Lottery phase, bet tiers and the height pair used for window checks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the lucky number space: numbers are `0..LUCKY_NUMBER_SPACE`.
pub const LUCKY_NUMBER_SPACE: u32 = 100_000;

/// Lifecycle phase of a lottery.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LotteryPhase {
    /// Created, no round opened yet.
    #[default]
    Created,
    /// Accepting purchases.
    Purchase,
    /// Last round drawn, waiting for the next purchase.
    Drawed,
    /// Terminal.
    Closed,
}

impl LotteryPhase {
    /// Numeric code used in receipts.
    pub fn code(self) -> i32 {
        match self {
            LotteryPhase::Created => 1,
            LotteryPhase::Purchase => 2,
            LotteryPhase::Drawed => 3,
            LotteryPhase::Closed => 4,
        }
    }

    /// Check if terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, LotteryPhase::Closed)
    }

    /// Whether a buy in this phase opens a new round.
    pub fn opens_round(self) -> bool {
        matches!(self, LotteryPhase::Created | LotteryPhase::Drawed)
    }
}

impl fmt::Display for LotteryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LotteryPhase::Created => "Created",
            LotteryPhase::Purchase => "Purchase",
            LotteryPhase::Drawed => "Drawed",
            LotteryPhase::Closed => "Closed",
        };
        f.write_str(name)
    }
}

/// Digit-match granularity a ticket wagers on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BetTier {
    /// Last digit.
    One = 1,
    /// Last two digits.
    Two = 2,
    /// Last three digits.
    Three = 3,
    /// All five digits.
    Five = 5,
}

impl BetTier {
    /// Decode the raw `way` value carried by a buy. Unknown values never win.
    pub fn from_way(way: u32) -> Option<Self> {
        match way {
            1 => Some(BetTier::One),
            2 => Some(BetTier::Two),
            3 => Some(BetTier::Three),
            5 => Some(BetTier::Five),
            _ => None,
        }
    }

    /// Raw `way` value.
    pub fn way(self) -> u32 {
        self as u32
    }

    /// Payout multiplier when the ticket matches.
    pub fn multiplier(self) -> u64 {
        match self {
            BetTier::Five => 100_000,
            BetTier::Three => 1_000,
            BetTier::Two => 100,
            BetTier::One => 10,
        }
    }

    /// Modulus the lucky and guessed numbers are compared under.
    pub fn match_modulus(self) -> u32 {
        match self {
            BetTier::Five => LUCKY_NUMBER_SPACE,
            BetTier::Three => 1_000,
            BetTier::Two => 100,
            BetTier::One => 10,
        }
    }
}

/// Which ledger anchors timing and randomness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainMode {
    /// The lottery runs on the main chain; local heights are authoritative.
    #[default]
    Main,
    /// The lottery runs on a dependent chain; main-chain heights are authoritative.
    Parachain,
}

/// A phase-entry point: the local height plus, on a dependent chain, the
/// main-chain height resolved for the same transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightMark {
    /// Local block height.
    pub local: u64,
    /// Main-chain height, present only in parachain mode.
    pub main: Option<u64>,
}

impl HeightMark {
    /// A purely local mark.
    pub fn local(height: u64) -> Self {
        Self {
            local: height,
            main: None,
        }
    }

    /// The height window checks are measured against.
    pub fn reference(&self) -> u64 {
        self.main.unwrap_or(self.local)
    }

    /// Heights elapsed from `since` to `self`, saturating at zero.
    pub fn elapsed_since(&self, since: &HeightMark) -> u64 {
        self.reference().saturating_sub(since.reference())
    }
}
