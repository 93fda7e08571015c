//! # Domain Layer for Transactions
//!
//! ## Modules
//!
//! - `payload`: the variant family and the unsigned transaction body
//! - `kinds`: per-kind validation and effects
//! - `envelope`: the signed transaction envelope
//! - `fees`: the size-based minimum-fee schedule
//! - `wire`: packed and RLP forms of bodies and envelopes

pub mod envelope;
pub mod fees;
pub mod kinds;
pub mod payload;
pub mod wire;

pub use envelope::*;
pub use fees::*;
pub use kinds::names::{commitment_hash, name_hash, normalize_name};
pub use kinds::oracle::derive_query_id;
pub use payload::*;
