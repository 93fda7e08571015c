//! Block application.
//!
//! `apply_block` either produces a successor snapshot with a reproducible
//! root or rejects the whole block; there is no partially-applied state
//! observable by callers. The per-transaction path (`try_apply_tx`) is
//! shared with the candidate filter.

use mc_02_state_management::ChainState;
use mc_03_transactions::SignedTx;
use shared_types::{ChainConfig, ChainError, Hash, Height};
use tracing::{debug, warn};

/// The committed result of applying a block.
#[derive(Clone, Debug)]
pub struct AppliedBlock {
    /// The successor snapshot.
    pub state: ChainState,
    /// Root hash of the accounts subtree, exposed in block headers.
    pub accounts_root: Hash,
    /// Combined root committing to every subtree.
    pub state_root: Hash,
}

/// The chain-state transition engine. Holds the protocol configuration;
/// all state flows through arguments.
#[derive(Clone, Debug)]
pub struct ChainEngine {
    config: ChainConfig,
}

impl ChainEngine {
    /// Engine with the given protocol configuration.
    pub fn new(config: ChainConfig) -> Self {
        Self { config }
    }

    /// The configuration the engine validates against.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// The shared per-transaction path: envelope verification, then the
    /// kind's preconditions, then its effects. Returns the successor
    /// snapshot; the input is never mutated.
    pub fn try_apply_tx(
        &self,
        state: &ChainState,
        height: Height,
        tx: &SignedTx,
    ) -> Result<ChainState, ChainError> {
        tx.verify(&self.config)?;
        tx.data.preprocess(state, height)?;
        tx.data.apply(state, height, &self.config)
    }

    /// Apply a block's transactions in order to `state` at `height`.
    ///
    /// The first failure aborts the block as `InvalidBlock(inner)`. After
    /// the last transaction, expired oracle registrations and interactions
    /// are swept and the new roots are committed.
    pub fn apply_block(
        &self,
        state: &ChainState,
        height: Height,
        txs: &[SignedTx],
    ) -> Result<AppliedBlock, ChainError> {
        self.check_block_structure(txs)
            .map_err(ChainError::into_invalid_block)?;

        let mut current = state.clone();
        for (index, tx) in txs.iter().enumerate() {
            current = self.try_apply_tx(&current, height, tx).map_err(|err| {
                warn!(
                    height,
                    index,
                    kind = tx.data.payload.kind_name(),
                    %err,
                    "rejecting block"
                );
                err.into_invalid_block()
            })?;
        }

        let current = current
            .expire_oracles(height)?
            .expire_interactions(height)?;

        let applied = AppliedBlock {
            accounts_root: current.accounts_root(),
            state_root: current.root_hash(),
            state: current,
        };
        debug!(
            height,
            txs = txs.len(),
            state_root = %hex_prefix(&applied.state_root),
            "applied block"
        );
        Ok(applied)
    }

    /// Structure check: at most one Coinbase, and only in first position.
    fn check_block_structure(&self, txs: &[SignedTx]) -> Result<(), ChainError> {
        for (index, tx) in txs.iter().enumerate() {
            if tx.data.payload.is_coinbase() && index != 0 {
                return Err(ChainError::MalformedTx(
                    "coinbase must be the first transaction of its block".into(),
                ));
            }
        }
        Ok(())
    }
}

fn hex_prefix(hash: &Hash) -> String {
    hash[..4].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_03_transactions::DataTx;

    #[test]
    fn test_coinbase_after_first_position_rejected() {
        let engine = ChainEngine::new(ChainConfig::default());
        let coinbase = SignedTx::coinbase(DataTx::coinbase([3u8; 32], 10, 1));
        let err = engine
            .apply_block(
                &ChainState::empty(),
                1,
                &[coinbase.clone(), coinbase],
            )
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidBlock(_)));
    }

    #[test]
    fn test_empty_block_commits_unchanged_roots() {
        let engine = ChainEngine::new(ChainConfig::default());
        let state = ChainState::empty();
        let applied = engine.apply_block(&state, 1, &[]).unwrap();
        assert_eq!(applied.state_root, state.root_hash());
        assert_eq!(applied.accounts_root, state.accounts_root());
    }
}
