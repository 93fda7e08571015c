//! # mc-04-chain-engine
//!
//! The consensus-critical chain-state transition engine.
//!
//! ## Role in System
//!
//! - **Block Application**: fold a height-ordered transaction list over a
//!   snapshot, verifying signatures and dispatching per-kind preconditions
//!   and effects, then sweep expired oracle objects and commit the root
//! - **Failure Isolation**: one invalid transaction aborts a block but can
//!   never corrupt the input snapshot; the candidate filter instead skips
//!   it and threads the pre-transaction state
//! - **Single Dispatch Site**: block application and candidate filtering
//!   share one per-transaction path, so acceptance by the filter implies
//!   acceptance by block application against the same starting snapshot
//!
//! ## Critical Invariants
//!
//! 1. Transactions apply in list order; effects depend only on that order
//!    and the starting snapshot
//! 2. Supply is conserved by every kind except Coinbase, which grows it by
//!    exactly the reward
//! 3. Account nonces never decrease; an accepted transaction sets its
//!    sender's nonce to the transaction nonce
//! 4. No reachable state holds a negative balance
//! 5. Expiry sweeps are idempotent at a fixed height

pub mod domain;

pub use domain::*;
