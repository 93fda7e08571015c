//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature does not verify over the given message.
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Public key bytes are not a curve point.
    #[error("Invalid public key")]
    InvalidPublicKey,
}
