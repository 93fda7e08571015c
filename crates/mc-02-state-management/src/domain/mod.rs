//! # Domain Layer for State Management
//!
//! Pure domain logic, no I/O.
//!
//! ## Modules
//!
//! - `tree`: persistent Merkle state tree keyed by fixed-width identifiers
//! - `account`: per-account balance, nonce, and locked-funds schedule
//! - `records`: oracle and naming registry records and their wire forms
//! - `chainstate`: the five-subtree snapshot and its expiry sweeps

pub mod account;
pub mod chainstate;
pub mod records;
pub mod tree;

pub use account::*;
pub use chainstate::*;
pub use records::*;
pub use tree::*;
