//! The naming registry's three operations.
//!
//! PreClaim publishes a commitment; Claim reveals the name and salt behind
//! it; Revoke deletes an owned claim. The commitment scheme prevents
//! front-running: the name only appears on-chain after its hash is already
//! committed to the claimant.

use super::{check_funds_and_nonce, debit_and_bump, require_sender};
use crate::domain::payload::{DataTx, NameClaimPayload, NamePreClaimPayload, NameRevokePayload};
use mc_02_state_management::{ChainState, NameClaimRecord, NameCommitment};
use shared_crypto::{keccak256, Keccak256Hasher};
use shared_types::{ChainConfig, ChainError, Hash, Height};

const MAX_NAME_LEN: usize = 63;

/// Normalize a name: ASCII lowercased, letters, digits, and interior
/// hyphens only.
pub fn normalize_name(name: &str) -> Result<String, ChainError> {
    if name.is_empty() {
        return Err(ChainError::MalformedName("empty name".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ChainError::MalformedName(format!(
            "name exceeds {MAX_NAME_LEN} bytes"
        )));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(ChainError::MalformedName(
            "name may not start or end with a hyphen".into(),
        ));
    }
    let mut normalized = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            'a'..='z' | '0'..='9' | '-' => normalized.push(ch),
            'A'..='Z' => normalized.push(ch.to_ascii_lowercase()),
            other => {
                return Err(ChainError::MalformedName(format!(
                    "invalid character '{other}'"
                )))
            }
        }
    }
    Ok(normalized)
}

/// Trie key of a claimed name: `keccak(normalized_name)`.
pub fn name_hash(normalized_name: &str) -> Hash {
    keccak256(normalized_name.as_bytes())
}

/// Commitment hash: `keccak(normalized_name ∥ salt)`.
pub fn commitment_hash(normalized_name: &str, salt: &[u8]) -> Hash {
    let mut hasher = Keccak256Hasher::new();
    hasher.update(normalized_name.as_bytes()).update(salt);
    hasher.finalize()
}

// ---- preclaim --------------------------------------------------------

pub(crate) fn preclaim_preprocess(
    tx: &DataTx,
    payload: &NamePreClaimPayload,
    state: &ChainState,
    height: Height,
) -> Result<(), ChainError> {
    if state.get_commitment(&payload.commitment)?.is_some() {
        return Err(ChainError::PreClaimAlreadyExists);
    }
    check_funds_and_nonce(state, tx, tx.fee, height)
}

pub(crate) fn preclaim_apply(
    tx: &DataTx,
    payload: &NamePreClaimPayload,
    state: &ChainState,
    height: Height,
) -> Result<ChainState, ChainError> {
    let sender = require_sender(tx)?;
    let next = debit_and_bump(state, tx, tx.fee, height)?;
    Ok(next.put_commitment(
        &payload.commitment,
        &NameCommitment {
            owner: sender,
            created_at: height,
        },
    ))
}

// ---- claim -----------------------------------------------------------

pub(crate) fn claim_static_valid(
    payload: &NameClaimPayload,
    config: &ChainConfig,
) -> Result<(), ChainError> {
    if payload.name_salt.len() != config.name_salt_size {
        return Err(ChainError::MalformedTx(format!(
            "name salt must be exactly {} bytes, got {}",
            config.name_salt_size,
            payload.name_salt.len()
        )));
    }
    normalize_name(&payload.name).map(|_| ())
}

pub(crate) fn claim_preprocess(
    tx: &DataTx,
    payload: &NameClaimPayload,
    state: &ChainState,
    height: Height,
) -> Result<(), ChainError> {
    let sender = require_sender(tx)?;
    let normalized = normalize_name(&payload.name)?;

    // Existence first: a missing commitment must never be reported as an
    // ownership failure.
    let commitment = state
        .get_commitment(&commitment_hash(&normalized, &payload.name_salt))?
        .ok_or(ChainError::UnknownPreClaim)?;
    if commitment.owner != sender {
        return Err(ChainError::WrongPreClaimOwner);
    }
    if state.get_claim(&name_hash(&normalized))?.is_some() {
        return Err(ChainError::NameAlreadyClaimed);
    }
    check_funds_and_nonce(state, tx, tx.fee, height)
}

pub(crate) fn claim_apply(
    tx: &DataTx,
    payload: &NameClaimPayload,
    state: &ChainState,
    height: Height,
) -> Result<ChainState, ChainError> {
    let sender = require_sender(tx)?;
    let normalized = normalize_name(&payload.name)?;
    let next = debit_and_bump(state, tx, tx.fee, height)?;
    Ok(next
        .delete_commitment(&commitment_hash(&normalized, &payload.name_salt))
        .put_claim(
            &name_hash(&normalized),
            &NameClaimRecord {
                name: normalized,
                owner: sender,
                claimed_at: height,
            },
        ))
}

// ---- revoke ----------------------------------------------------------

pub(crate) fn revoke_preprocess(
    tx: &DataTx,
    payload: &NameRevokePayload,
    state: &ChainState,
    height: Height,
) -> Result<(), ChainError> {
    let sender = require_sender(tx)?;
    let claim = state
        .get_claim(&payload.name_hash)?
        .ok_or(ChainError::UnknownName)?;
    if claim.owner != sender {
        return Err(ChainError::WrongNameOwner);
    }
    check_funds_and_nonce(state, tx, tx.fee, height)
}

pub(crate) fn revoke_apply(
    tx: &DataTx,
    payload: &NameRevokePayload,
    state: &ChainState,
    height: Height,
) -> Result<ChainState, ChainError> {
    let next = debit_and_bump(state, tx, tx.fee, height)?;
    Ok(next.delete_claim(&payload.name_hash))
}
