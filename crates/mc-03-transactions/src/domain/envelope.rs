//! The signed transaction envelope.
//!
//! Binds a body to its detached signature. Both the signed message and the
//! transaction's identity hash are the packed encoding of the body alone,
//! so a transaction's id does not depend on who signed it.

use crate::domain::fees::{min_fee, FeeRole};
use crate::domain::payload::DataTx;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use shared_crypto::{keccak256, verify_detached, Ed25519KeyPair};
use shared_types::{ChainConfig, ChainError, Hash, SignatureBytes};

/// A transaction body plus its signature. Coinbase carries no signature.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    /// The unsigned body.
    pub data: DataTx,
    /// Detached Ed25519 signature over the body's packed bytes.
    #[serde_as(as = "Option<serde_with::Bytes>")]
    pub signature: Option<SignatureBytes>,
}

impl SignedTx {
    /// Wrap a body and signature, enforcing the configured signature size
    /// bound at construction.
    pub fn new(
        data: DataTx,
        signature: Option<SignatureBytes>,
        config: &ChainConfig,
    ) -> Result<Self, ChainError> {
        if let Some(sig) = &signature {
            if sig.len() > config.sign_max_size {
                return Err(ChainError::InvalidSignature);
            }
        }
        Ok(Self { data, signature })
    }

    /// Sign a body with `keypair`.
    pub fn sign(
        data: DataTx,
        keypair: &Ed25519KeyPair,
        config: &ChainConfig,
    ) -> Result<Self, ChainError> {
        let signature = keypair.sign(&data.packed_bytes());
        Self::new(data, Some(signature), config)
    }

    /// Wrap a Coinbase body, which carries no signature.
    pub fn coinbase(data: DataTx) -> Self {
        Self {
            data,
            signature: None,
        }
    }

    /// Full envelope verification: intrinsic checks on the body, then the
    /// signature over the body's packed bytes. Coinbase short-circuits the
    /// signature check because it carries none.
    pub fn verify(&self, config: &ChainConfig) -> Result<(), ChainError> {
        self.data.static_valid(config)?;

        if self.data.payload.is_coinbase() {
            if self.signature.is_some() {
                return Err(ChainError::InvalidSignature);
            }
            return Ok(());
        }

        let sender = self
            .data
            .sender
            .ok_or_else(|| ChainError::MalformedTx("missing sender".into()))?;
        let signature = self.signature.ok_or(ChainError::InvalidSignature)?;
        if signature.len() > config.sign_max_size {
            return Err(ChainError::InvalidSignature);
        }
        verify_detached(&sender, &self.data.packed_bytes(), &signature)
            .map_err(|_| ChainError::InvalidSignature)
    }

    /// The transaction's identity: `keccak256` of the body's packed bytes.
    /// Independent of the signature.
    pub fn tx_hash(&self) -> Hash {
        keccak256(&self.data.packed_bytes())
    }

    /// True when the carried fee satisfies the schedule for `role`.
    pub fn meets_min_fee(&self, config: &ChainConfig, role: FeeRole) -> bool {
        self.data.fee >= min_fee(config, self.wire_size(), role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payload::{SpendPayload, TxPayload};

    fn spend_body(keypair: &Ed25519KeyPair, nonce: u64) -> DataTx {
        DataTx::new(
            TxPayload::Spend(SpendPayload {
                receiver: [2u8; 32],
                amount: 40,
                version: 1,
            }),
            keypair.public_key_bytes(),
            1,
            nonce,
        )
    }

    #[test]
    fn test_sign_then_verify_round_trip() {
        let config = ChainConfig::default();
        let keypair = Ed25519KeyPair::from_seed([0x42u8; 32]);
        let stx = SignedTx::sign(spend_body(&keypair, 1), &keypair, &config).unwrap();
        stx.verify(&config).unwrap();
    }

    #[test]
    fn test_tampered_body_fails_verification() {
        let config = ChainConfig::default();
        let keypair = Ed25519KeyPair::from_seed([0x42u8; 32]);
        let mut stx = SignedTx::sign(spend_body(&keypair, 1), &keypair, &config).unwrap();
        stx.data.fee = 999;
        assert_eq!(stx.verify(&config).unwrap_err(), ChainError::InvalidSignature);
    }

    #[test]
    fn test_signature_by_other_key_fails() {
        let config = ChainConfig::default();
        let owner = Ed25519KeyPair::from_seed([0x42u8; 32]);
        let thief = Ed25519KeyPair::from_seed([0x43u8; 32]);
        let stx = SignedTx::sign(spend_body(&owner, 1), &thief, &config).unwrap();
        assert_eq!(stx.verify(&config).unwrap_err(), ChainError::InvalidSignature);
    }

    #[test]
    fn test_missing_signature_fails_for_signed_kinds() {
        let config = ChainConfig::default();
        let keypair = Ed25519KeyPair::from_seed([0x42u8; 32]);
        let stx = SignedTx::new(spend_body(&keypair, 1), None, &config).unwrap();
        assert_eq!(stx.verify(&config).unwrap_err(), ChainError::InvalidSignature);
    }

    #[test]
    fn test_oversized_signature_rejected_at_construction() {
        let config = ChainConfig {
            sign_max_size: 32,
            ..ChainConfig::default()
        };
        let keypair = Ed25519KeyPair::from_seed([0x42u8; 32]);
        let err = SignedTx::sign(spend_body(&keypair, 1), &keypair, &config).unwrap_err();
        assert_eq!(err, ChainError::InvalidSignature);
    }

    #[test]
    fn test_coinbase_verifies_without_signature() {
        let config = ChainConfig::default();
        let coinbase = SignedTx::coinbase(DataTx::coinbase([3u8; 32], 10, 7));
        coinbase.verify(&config).unwrap();
    }

    #[test]
    fn test_coinbase_with_signature_rejected() {
        let config = ChainConfig::default();
        let stx = SignedTx {
            data: DataTx::coinbase([3u8; 32], 10, 7),
            signature: Some([0u8; 64]),
        };
        assert_eq!(stx.verify(&config).unwrap_err(), ChainError::InvalidSignature);
    }

    #[test]
    fn test_tx_hash_is_signature_independent() {
        let config = ChainConfig::default();
        let a = Ed25519KeyPair::from_seed([0x42u8; 32]);
        let b = Ed25519KeyPair::from_seed([0x43u8; 32]);
        let body = spend_body(&a, 1);
        let signed_by_a = SignedTx::sign(body.clone(), &a, &config).unwrap();
        let signed_by_b = SignedTx::sign(body, &b, &config).unwrap();
        assert_eq!(signed_by_a.tx_hash(), signed_by_b.tx_hash());
        assert_ne!(signed_by_a.signature, signed_by_b.signature);
    }

    #[test]
    fn test_fee_schedule_hookup() {
        let config = ChainConfig::default();
        let keypair = Ed25519KeyPair::from_seed([0x42u8; 32]);
        let stx = SignedTx::sign(spend_body(&keypair, 1), &keypair, &config).unwrap();
        // fee = 1 = minimum_fee, and the wire form is far below one token
        // of bytes at either rate.
        assert!(stx.meets_min_fee(&config, FeeRole::Pool));
        assert!(stx.meets_min_fee(&config, FeeRole::Miner));
        assert!(stx.meets_min_fee(&config, FeeRole::Validation));
    }
}
