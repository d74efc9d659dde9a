//! # Domain Invariants
//!
//! Creation-time rules for a lottery's configuration.

use super::errors::LotteryError;

/// Inclusive upper bound for operator and developer reward ratios.
pub const MAX_REWARD_RATIO: u64 = 100;

/// Hard floor for a lottery's purchase window, in blocks.
pub const PURCHASE_WINDOW_FLOOR: u64 = 30;

/// Hard floor for a lottery's draw window, in blocks.
pub const DRAW_WINDOW_FLOOR: u64 = 40;

/// Invariant: reward ratios within `[0, MAX_REWARD_RATIO]`.
pub fn invariant_reward_ratios(op: u64, dev: u64) -> Result<(), LotteryError> {
    if op > MAX_REWARD_RATIO || dev > MAX_REWARD_RATIO {
        return Err(LotteryError::InvalidRewardRatio {
            op,
            dev,
            max: MAX_REWARD_RATIO,
        });
    }
    Ok(())
}

/// Invariant: `purchase >= min_purchase`, `draw >= min_draw`, `purchase <= draw`.
///
/// The minimums never drop below [`PURCHASE_WINDOW_FLOOR`] and
/// [`DRAW_WINDOW_FLOOR`]. Checked in that order so the reported error is
/// deterministic.
pub fn invariant_windows(
    purchase: u64,
    draw: u64,
    min_purchase: u64,
    min_draw: u64,
) -> Result<(), LotteryError> {
    let min_purchase = min_purchase.max(PURCHASE_WINDOW_FLOOR);
    let min_draw = min_draw.max(DRAW_WINDOW_FLOOR);
    if purchase < min_purchase {
        return Err(LotteryError::PurchaseWindowTooShort {
            got: purchase,
            min: min_purchase,
        });
    }
    if draw < min_draw {
        return Err(LotteryError::DrawWindowTooShort {
            got: draw,
            min: min_draw,
        });
    }
    if purchase > draw {
        return Err(LotteryError::DrawWindowBelowPurchaseWindow { purchase, draw });
    }
    Ok(())
}
