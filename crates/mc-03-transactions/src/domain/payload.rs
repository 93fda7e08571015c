//! The transaction variant family and the unsigned transaction body.

use mc_02_state_management::OracleFormat;
use serde::{Deserialize, Serialize};
use shared_types::{Hash, PublicKey, Ttl};

/// Token transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendPayload {
    /// Receiving account.
    pub receiver: PublicKey,
    /// Transferred amount.
    pub amount: u64,
    /// Protocol version the sender built the transaction against.
    pub version: u8,
}

/// Block-reward mint. Carries no sender and no signature; the envelope
/// nonce slot carries the block height by convention.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinbasePayload {
    /// Rewarded account (the miner).
    pub receiver: PublicKey,
    /// Minted reward.
    pub amount: u64,
}

/// Oracle registration, keyed by the sender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRegisterPayload {
    /// Format queries must conform to.
    pub query_format: OracleFormat,
    /// Format responses must conform to.
    pub response_format: OracleFormat,
    /// Fee each querier must escrow.
    pub query_fee: u64,
    /// Registration lifetime.
    pub ttl: Ttl,
}

/// Query addressed to a registered oracle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleQueryPayload {
    /// The oracle being queried.
    pub oracle: PublicKey,
    /// Query payload.
    pub query_data: Vec<u8>,
    /// Escrowed fee for the responding oracle.
    pub query_fee: u64,
    /// How long the query stays answerable.
    pub query_ttl: Ttl,
    /// How long past the query expiry the interaction is retained;
    /// must be relative.
    pub response_ttl: Ttl,
}

/// Response to an open query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleResponsePayload {
    /// Derived id of the interaction being answered.
    pub query_id: Hash,
    /// Response payload.
    pub response_data: Vec<u8>,
}

/// Extension of a registration's lifetime; must be relative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleExtendPayload {
    /// Additional lifetime.
    pub ttl: Ttl,
}

/// Commitment to a future name claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePreClaimPayload {
    /// `keccak(normalized_name ∥ salt)`.
    pub commitment: Hash,
}

/// Reveal of a committed name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameClaimPayload {
    /// The name being claimed; normalized before hashing.
    pub name: String,
    /// The salt the commitment was built with.
    pub name_salt: Vec<u8>,
}

/// Revocation of an owned claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRevokePayload {
    /// Hash of the claimed name.
    pub name_hash: Hash,
}

/// The closed variant family.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxPayload {
    /// Token transfer.
    Spend(SpendPayload),
    /// Block-reward mint.
    Coinbase(CoinbasePayload),
    /// Oracle registration.
    OracleRegister(OracleRegisterPayload),
    /// Oracle query.
    OracleQuery(OracleQueryPayload),
    /// Oracle response.
    OracleResponse(OracleResponsePayload),
    /// Oracle lifetime extension.
    OracleExtend(OracleExtendPayload),
    /// Name pre-claim commitment.
    NamePreClaim(NamePreClaimPayload),
    /// Name claim reveal.
    NameClaim(NameClaimPayload),
    /// Name revocation.
    NameRevoke(NameRevokePayload),
}

impl TxPayload {
    /// True for the one senderless kind.
    pub fn is_coinbase(&self) -> bool {
        matches!(self, TxPayload::Coinbase(_))
    }

    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TxPayload::Spend(_) => "spend",
            TxPayload::Coinbase(_) => "coinbase",
            TxPayload::OracleRegister(_) => "oracle_register",
            TxPayload::OracleQuery(_) => "oracle_query",
            TxPayload::OracleResponse(_) => "oracle_response",
            TxPayload::OracleExtend(_) => "oracle_extend",
            TxPayload::NamePreClaim(_) => "name_preclaim",
            TxPayload::NameClaim(_) => "name_claim",
            TxPayload::NameRevoke(_) => "name_revoke",
        }
    }
}

/// The unsigned transaction body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTx {
    /// Kind-specific payload.
    pub payload: TxPayload,
    /// Sender public key; `None` only for Coinbase.
    pub sender: Option<PublicKey>,
    /// Fee paid to the block producer.
    pub fee: u64,
    /// Replay-protection nonce; must exceed the sender's account nonce.
    /// For Coinbase this slot carries the block height by convention.
    pub nonce: u64,
}

impl DataTx {
    /// Body for a signed, single-sender kind.
    pub fn new(payload: TxPayload, sender: PublicKey, fee: u64, nonce: u64) -> Self {
        Self {
            payload,
            sender: Some(sender),
            fee,
            nonce,
        }
    }

    /// Body for a Coinbase at the given height.
    pub fn coinbase(receiver: PublicKey, amount: u64, height: u64) -> Self {
        Self {
            payload: TxPayload::Coinbase(CoinbasePayload { receiver, amount }),
            sender: None,
            fee: 0,
            nonce: height,
        }
    }
}
