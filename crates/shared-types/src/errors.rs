//! # Error Types
//!
//! The stable error taxonomy for transaction validation and block
//! application. Kinds carry typed fields; rendering is for diagnostics only
//! and is never part of consensus.

use thiserror::Error;

/// Protocol-level validation failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    /// Signature does not verify, is missing, or exceeds the maximum size.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Static structural check failed (bad version, wrong sender count,
    /// malformed payload field).
    #[error("Malformed transaction: {0}")]
    MalformedTx(String),

    /// Sender cannot cover fee plus amount.
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    /// Transaction nonce is not strictly greater than the account nonce.
    #[error("Nonce out of order: account at {current}, transaction carries {attempted}")]
    NonceOutOfOrder { current: u64, attempted: u64 },

    /// Crediting an account would overflow its balance.
    #[error("Balance overflow")]
    BalanceOverflow,

    /// Referenced oracle is not registered.
    #[error("Unknown oracle")]
    UnknownOracle,

    /// Oracle object exists in a state that forbids the operation.
    #[error("Oracle state conflict: {0}")]
    OracleStateConflict(String),

    /// Query or response data does not conform to the oracle's declared format.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// No pre-claim commitment exists for the revealed name and salt.
    #[error("Unknown pre-claim commitment")]
    UnknownPreClaim,

    /// A pre-claim commitment already exists at this commitment hash.
    #[error("Pre-claim commitment already exists")]
    PreClaimAlreadyExists,

    /// The pre-claim commitment is owned by a different account.
    #[error("Pre-claim commitment owned by another account")]
    WrongPreClaimOwner,

    /// A claim already exists at the name hash.
    #[error("Name already claimed")]
    NameAlreadyClaimed,

    /// No claim exists at the name hash.
    #[error("Unknown name")]
    UnknownName,

    /// The claim at the name hash is owned by a different account.
    #[error("Name owned by another account")]
    WrongNameOwner,

    /// Name fails normalization.
    #[error("Malformed name: {0}")]
    MalformedName(String),

    /// Canonical encoder or decoder rejected the bytes.
    #[error("Encoding rejected: {0}")]
    EncodingError(String),

    /// Key/value store failure surfaced through the persistence port.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Escalation produced by `apply_block`: the block is invalid because
    /// of the inner transaction failure.
    #[error("Invalid block: {0}")]
    InvalidBlock(Box<ChainError>),
}

impl ChainError {
    /// Wraps a transaction-level failure as a block-level rejection.
    pub fn into_invalid_block(self) -> ChainError {
        match self {
            already @ ChainError::InvalidBlock(_) => already,
            inner => ChainError::InvalidBlock(Box::new(inner)),
        }
    }

    /// The transaction-level kind, unwrapping block escalation.
    pub fn inner(&self) -> &ChainError {
        match self {
            ChainError::InvalidBlock(inner) => inner,
            other => other,
        }
    }
}
