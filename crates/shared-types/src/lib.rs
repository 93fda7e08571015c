//! # Shared Types Crate
//!
//! This crate contains the domain types every Meridian Chain subsystem
//! builds on: fixed-width identifiers, time-to-live values, the protocol
//! configuration, the stable error taxonomy, and the human-facing
//! base58-check address envelope.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: cross-subsystem types are defined here and
//!   nowhere else.
//! - **Structured Errors**: every failure is a `ChainError` kind with typed
//!   fields, never presentation text.
//! - **No Consensus Bytes via Serde**: serde derives exist for operator
//!   tooling and tests; the canonical byte forms live in the codec crate.

pub mod address;
pub mod config;
pub mod entities;
pub mod errors;

pub use address::{decode_envelope, encode_envelope, AddressPrefix};
pub use config::ChainConfig;
pub use entities::*;
pub use errors::ChainError;
