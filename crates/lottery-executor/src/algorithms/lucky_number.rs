//! # Lucky Number Derivation
//!
//! The first four bytes of the oracle hash, read big-endian, reduced modulo
//! the lucky number space.

use crate::domain::{LotteryError, LUCKY_NUMBER_SPACE};

/// Derive the lucky number from an oracle hash.
pub fn lucky_number_from_hash(hash: &[u8]) -> Result<u32, LotteryError> {
    let head: [u8; 4] = hash
        .get(..4)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(LotteryError::InvalidLuckyNumber)?;
    Ok(u32::from_be_bytes(head) % LUCKY_NUMBER_SPACE)
}

/// Check a number lies in `[0, LUCKY_NUMBER_SPACE)`.
pub fn is_valid_number(number: u32) -> bool {
    number < LUCKY_NUMBER_SPACE
}
