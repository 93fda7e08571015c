//! # mc-01-codec
//!
//! Canonical byte encodings for Meridian Chain.
//!
//! Two encodings coexist, and both are consensus-critical:
//!
//! - **Packed encoding** (`packed`): the deterministic, field-ordered form a
//!   transaction body is signed and hashed over. Field order is fixed by the
//!   per-kind encoder functions; integers are length-minimal big-endian;
//!   optional fields are encoded with an explicit presence byte.
//! - **RLP wire encoding** (`rlp`): recursive-length-prefix lists
//!   `[tag, version, field₁, …, fieldₙ]` used on the network and in storage.
//!
//! The type-tag table (`tags`) is the single source of truth for both
//! directions of the wire form. Changing any byte emitted by this crate is a
//! hard fork.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod packed;
pub mod rlp;
pub mod tags;

pub use errors::CodecError;
pub use packed::{PackedReader, PackedWriter};
pub use rlp::RlpItem;
pub use tags::{TxTag, WIRE_VERSION};
