//! # Shared Crypto - Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | State commitments, tx identity, derived ids |
//! | `signatures` | Ed25519 | Transaction signing |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency at signing time
//! - **Keccak-256**: single digest for every consensus commitment, so two
//!   nodes can never disagree on which hash a root was built with

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

pub use errors::CryptoError;
pub use hashing::{keccak256, Keccak256Hasher};
pub use signatures::{verify_detached, Ed25519KeyPair};
