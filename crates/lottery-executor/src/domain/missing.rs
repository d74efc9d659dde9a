//! # Missing-Number Table
//!
//! Per position of the 5-digit lucky number, counts how many draws each
//! digit did NOT appear in. Counters only grow.

use serde::{Deserialize, Serialize};

/// Digit positions in a lucky number (ten-thousands to units).
pub const DIGIT_POSITIONS: usize = 5;

/// Fixed 5x10 table of missing counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingTable {
    times: [[u32; 10]; DIGIT_POSITIONS],
}

impl MissingTable {
    /// Split a lucky number into its 5 digits, most significant first.
    pub fn digits(lucky: u32) -> [u8; DIGIT_POSITIONS] {
        let mut out = [0u8; DIGIT_POSITIONS];
        let mut rest = lucky % 100_000;
        let mut divisor = 10_000;
        for digit in out.iter_mut() {
            *digit = (rest / divisor) as u8;
            rest %= divisor;
            divisor /= 10;
        }
        out
    }

    /// Account one draw: every digit other than the drawn one, at every
    /// position, gets its counter bumped.
    pub fn record(&mut self, lucky: u32) {
        for (position, drawn) in Self::digits(lucky).iter().enumerate() {
            for (digit, counter) in self.times[position].iter_mut().enumerate() {
                if digit != usize::from(*drawn) {
                    *counter = counter.saturating_add(1);
                }
            }
        }
    }

    /// Counter for `digit` at `position` (0 = ten-thousands).
    pub fn times(&self, position: usize, digit: usize) -> u32 {
        self.times
            .get(position)
            .and_then(|row| row.get(digit))
            .copied()
            .unwrap_or(0)
    }

    /// Raw table, one row per position.
    pub fn rows(&self) -> &[[u32; 10]; DIGIT_POSITIONS] {
        &self.times
    }
}
