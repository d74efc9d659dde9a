//! Local height resolver for lotteries running on the main chain.

use crate::domain::{HeightMark, OracleError};
use crate::ports::outbound::HeightResolver;
use shared_types::TxContext;

/// Resolves heights from the transaction context alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalHeightResolver;

impl HeightResolver for LocalHeightResolver {
    fn resolve(&self, ctx: &TxContext) -> Result<HeightMark, OracleError> {
        Ok(HeightMark::local(ctx.height))
    }

    /// The executing block is not queryable yet, so randomness is sampled
    /// from the block before it.
    fn randomness_height(&self, mark: &HeightMark) -> u64 {
        mark.local.saturating_sub(1)
    }
}
