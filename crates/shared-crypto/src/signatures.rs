//! # Transaction Signing
//!
//! One scheme, Ed25519, used in raw byte form end to end: accounts are
//! keyed in the state trees by the 32-byte verifying key, and envelopes
//! carry the 64-byte detached signature over the body's packed bytes.
//! Because nothing downstream ever holds a parsed key or signature, this
//! module signs from and verifies against those raw forms directly.
//!
//! ## Security Properties
//!
//! - Deterministic nonces (no RNG dependency at signing time)
//! - Seed material zeroized on drop

use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use shared_types::{PublicKey, SignatureBytes};
use zeroize::Zeroize;

/// A signing identity. Its verifying key's raw bytes are the account's
/// address in the accounts tree and the oracle/naming owner fields.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Generate a fresh identity.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::thread_rng()),
        }
    }

    /// Rebuild an identity from its 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// The secret seed, for wallet storage.
    pub fn to_seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// The account key this identity signs for.
    pub fn public_key_bytes(&self) -> PublicKey {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Detached signature over `message` (a transaction body's packed
    /// bytes), in the raw form the envelope carries.
    pub fn sign(&self, message: &[u8]) -> SignatureBytes {
        self.signing_key.sign(message).to_bytes()
    }
}

impl Drop for Ed25519KeyPair {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}

/// Verify a detached signature from the raw byte forms the chain stores.
///
/// Distinguishes a key that is not a curve point from a signature that
/// does not verify, so envelope diagnostics can tell a corrupt sender
/// field from a forged signature.
pub fn verify_detached(
    public_key: &PublicKey,
    message: &[u8],
    signature: &SignatureBytes,
) -> Result<(), CryptoError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key).map_err(|_| CryptoError::InvalidPublicKey)?;
    let sig = ed25519_dalek::Signature::from_bytes(signature);
    verifying_key
        .verify(message, &sig)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}
