//! # Integration Scenarios
//!
//! All scenarios drive a [`lottery_runtime::LotteryNode`] block by block
//! through the [`fixtures::Chain`] helper.

#[cfg(test)]
pub(crate) mod fixtures;

#[cfg(test)]
mod history_flow;
#[cfg(test)]
mod multi_round;
#[cfg(test)]
mod script_flow;
