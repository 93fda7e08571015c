//! # mc-03-transactions
//!
//! The closed transaction variant family of Meridian Chain.
//!
//! ## Role in System
//!
//! - **Variant Set**: one enum, nine kinds: Spend, Coinbase, the four
//!   oracle operations, and the three name-lifecycle operations
//! - **Uniform Capability Surface**: every kind supplies intrinsic checks
//!   (`static_valid`), state-dependent preconditions (`preprocess`), and
//!   effects (`apply`); the engine has exactly one dispatch site
//! - **Envelope**: [`SignedTx`](domain::SignedTx) binds a body to its
//!   signature; the signed message is always the packed encoding of the body
//!
//! ## Validation Contract
//!
//! `preprocess` checks preconditions in a fixed order and returns the first
//! failure; `apply` assumes a preprocess-accepted input and only fails on a
//! broken state invariant. `apply` must leave untouched subtrees
//! structurally shared with the input snapshot.

pub mod domain;

pub use domain::*;
