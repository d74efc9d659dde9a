//! Blocking bridge to the remote main-chain client.
//!
//! The executor's capabilities are synchronous. On a dependent chain the
//! height and randomness lookups go through an async `MainChainClient`; this
//! adapter owns a current-thread tokio runtime and blocks on each call so the
//! action still runs as one uninterrupted call chain.
//!
//! Must not be used from inside another tokio runtime.

use crate::domain::{HeightMark, OracleError};
use crate::ports::outbound::{HeightResolver, MainChainClient, RandomnessOracle};
use shared_types::TxContext;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, error};

/// Main-chain anchored height resolver and randomness oracle.
pub struct BlockingMainChain<C: MainChainClient> {
    client: Arc<C>,
    runtime: Runtime,
}

impl<C: MainChainClient> BlockingMainChain<C> {
    /// Wrap `client` with a private runtime.
    pub fn new(client: Arc<C>) -> Result<Self, OracleError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| OracleError::Remote(format!("runtime: {e}")))?;
        Ok(Self { client, runtime })
    }

    /// The wrapped client.
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }
}

impl<C: MainChainClient> HeightResolver for BlockingMainChain<C> {
    fn resolve(&self, ctx: &TxContext) -> Result<HeightMark, OracleError> {
        let main = self
            .runtime
            .block_on(self.client.main_height_by_tx(&ctx.tx_hash))?;
        if main < 0 {
            error!(tx = %ctx.tx_hash_hex(), main, "main height unresolved");
            return Err(OracleError::MainHeightUnavailable);
        }
        debug!(local = ctx.height, main, "resolved main height");
        Ok(HeightMark {
            local: ctx.height,
            main: Some(main as u64),
        })
    }

    fn randomness_height(&self, mark: &HeightMark) -> u64 {
        mark.reference()
    }
}

impl<C: MainChainClient> RandomnessOracle for BlockingMainChain<C> {
    fn random_hash(
        &self,
        reference_height: u64,
        sample_blocks: u64,
    ) -> Result<Vec<u8>, OracleError> {
        self.runtime
            .block_on(self.client.rand_hash(reference_height, sample_blocks))
    }
}
