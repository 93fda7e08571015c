//! # Core Domain Entities
//!
//! Fixed-width identifiers and small value types shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `Hash`, `PublicKey`, `SignatureBytes`
//! - **Time**: `Height`, `Ttl`

use serde::{Deserialize, Serialize};

/// A 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

/// A 32-byte Ed25519 public key. Accounts are keyed by these bytes.
pub type PublicKey = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type SignatureBytes = [u8; 64];

/// Block height.
pub type Height = u64;

/// The all-zero digest, used as the root hash of an empty state tree.
pub const EMPTY_ROOT: Hash = [0u8; 32];

/// Time-to-live for oracle objects.
///
/// Wire form is `(type_byte, value)` with 0 = absolute, 1 = relative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ttl {
    /// Expires at this exact height.
    Absolute(Height),
    /// Expires `value` blocks after the creating transaction's height.
    Relative(Height),
}

impl Ttl {
    /// Resolves the TTL against the height it was created at.
    pub fn expiry_height(&self, created_at: Height) -> Height {
        match *self {
            Ttl::Absolute(h) => h,
            Ttl::Relative(delta) => created_at.saturating_add(delta),
        }
    }

    /// Wire type byte: 0 for absolute, 1 for relative.
    pub fn type_byte(&self) -> u8 {
        match self {
            Ttl::Absolute(_) => 0,
            Ttl::Relative(_) => 1,
        }
    }

    /// The raw TTL value, without resolving it.
    pub fn value(&self) -> Height {
        match *self {
            Ttl::Absolute(v) | Ttl::Relative(v) => v,
        }
    }

    /// Rebuilds a TTL from its wire pair.
    pub fn from_wire(type_byte: u8, value: Height) -> Option<Self> {
        match type_byte {
            0 => Some(Ttl::Absolute(value)),
            1 => Some(Ttl::Relative(value)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_ttl_ignores_creation_height() {
        assert_eq!(Ttl::Absolute(500).expiry_height(100), 500);
    }

    #[test]
    fn test_relative_ttl_offsets_creation_height() {
        assert_eq!(Ttl::Relative(50).expiry_height(100), 150);
    }

    #[test]
    fn test_wire_round_trip() {
        for ttl in [Ttl::Absolute(7), Ttl::Relative(9)] {
            let rebuilt = Ttl::from_wire(ttl.type_byte(), ttl.value()).unwrap();
            assert_eq!(rebuilt, ttl);
        }
        assert!(Ttl::from_wire(2, 1).is_none());
    }
}
