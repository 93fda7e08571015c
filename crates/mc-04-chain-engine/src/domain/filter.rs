//! The candidate filter pipeline.
//!
//! Pure transformation used when assembling a candidate block: invalid
//! transactions are dropped, valid ones thread the provisional state. The
//! surviving subsequence is order-preserving, and because it goes through
//! the same per-transaction path it is guaranteed to apply cleanly as a
//! block against the same starting snapshot.

use crate::domain::engine::ChainEngine;
use mc_02_state_management::ChainState;
use mc_03_transactions::SignedTx;
use shared_types::Height;
use tracing::debug;

impl ChainEngine {
    /// Drop invalid transactions from a candidate list, threading the
    /// provisional state through the accepted ones.
    ///
    /// Returns the state after every accepted transaction and the accepted
    /// subsequence in its original order. A transaction that fails leaves
    /// the threaded state exactly as it was before it.
    pub fn filter_valid(
        &self,
        state: &ChainState,
        height: Height,
        txs: Vec<SignedTx>,
    ) -> (ChainState, Vec<SignedTx>) {
        let mut current = state.clone();
        let mut accepted = Vec::with_capacity(txs.len());

        for tx in txs {
            // A coinbase anywhere but the head of the accepted list would
            // make the result unusable as a block; drop it here so filter
            // output always applies cleanly.
            if tx.data.payload.is_coinbase() && !accepted.is_empty() {
                debug!(height, "dropping misplaced coinbase candidate");
                continue;
            }
            match self.try_apply_tx(&current, height, &tx) {
                Ok(next) => {
                    current = next;
                    accepted.push(tx);
                }
                Err(err) => {
                    debug!(
                        height,
                        kind = tx.data.payload.kind_name(),
                        %err,
                        "dropping invalid candidate"
                    );
                }
            }
        }

        (current, accepted)
    }
}
