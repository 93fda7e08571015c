//! # mc-02-state-management
//!
//! Chain-state for Meridian Chain.
//!
//! ## Role in System
//!
//! - **Single Source of Truth**: the authoritative balances, oracle
//!   records, and name registry live in the state trees defined here
//! - **Immutable Snapshots**: every transition produces a new
//!   [`ChainState`](domain::ChainState) value; unchanged subtrees are
//!   structurally shared, so snapshots are cheap and readers never lock
//! - **Deterministic Roots**: a tree's root hash depends only on its
//!   key/value contents, never on the order operations arrived in
//!
//! ## Module Structure
//!
//! - [`domain`]: the Merkle state tree, account model, oracle/name
//!   records, and the snapshot type
//! - [`ports`]: the key/value persistence abstraction
//! - [`adapters`]: in-memory persistence for tests and tooling

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
