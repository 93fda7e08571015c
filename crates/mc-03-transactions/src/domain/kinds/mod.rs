//! Per-kind validation and effects, with a single dispatch site.
//!
//! The engine never matches on the payload itself; it calls the three
//! capability methods on [`DataTx`] and this module fans out.

pub mod coinbase;
pub mod names;
pub mod oracle;
pub mod spend;

use crate::domain::payload::{DataTx, TxPayload};
use mc_02_state_management::{Account, ChainState};
use shared_types::{ChainConfig, ChainError, Height, PublicKey};

impl DataTx {
    /// Intrinsic checks needing no state: sender presence, version, field
    /// shapes.
    pub fn static_valid(&self, config: &ChainConfig) -> Result<(), ChainError> {
        match (&self.payload, &self.sender) {
            (TxPayload::Coinbase(_), Some(_)) => {
                return Err(ChainError::MalformedTx("coinbase carries a sender".into()))
            }
            (TxPayload::Coinbase(_), None) if self.fee != 0 => {
                return Err(ChainError::MalformedTx("coinbase carries a fee".into()))
            }
            (TxPayload::Coinbase(_), None) => {}
            (_, None) => {
                return Err(ChainError::MalformedTx(format!(
                    "{} requires exactly one sender",
                    self.payload.kind_name()
                )))
            }
            (_, Some(_)) => {}
        }

        match &self.payload {
            TxPayload::Spend(payload) => spend::static_valid(payload, config),
            TxPayload::Coinbase(_) => Ok(()),
            TxPayload::OracleQuery(payload) => oracle::query_static_valid(payload),
            TxPayload::OracleExtend(payload) => oracle::extend_static_valid(payload),
            TxPayload::NameClaim(payload) => names::claim_static_valid(payload, config),
            TxPayload::OracleRegister(_)
            | TxPayload::OracleResponse(_)
            | TxPayload::NamePreClaim(_)
            | TxPayload::NameRevoke(_) => Ok(()),
        }
    }

    /// State-dependent preconditions, checked in a fixed order; the first
    /// failure is returned.
    pub fn preprocess(&self, state: &ChainState, height: Height) -> Result<(), ChainError> {
        match &self.payload {
            TxPayload::Spend(payload) => spend::preprocess(self, payload, state, height),
            TxPayload::Coinbase(_) => Ok(()),
            TxPayload::OracleRegister(payload) => {
                oracle::register_preprocess(self, payload, state, height)
            }
            TxPayload::OracleQuery(payload) => {
                oracle::query_preprocess(self, payload, state, height)
            }
            TxPayload::OracleResponse(payload) => {
                oracle::response_preprocess(self, payload, state, height)
            }
            TxPayload::OracleExtend(payload) => {
                oracle::extend_preprocess(self, payload, state, height)
            }
            TxPayload::NamePreClaim(payload) => {
                names::preclaim_preprocess(self, payload, state, height)
            }
            TxPayload::NameClaim(payload) => names::claim_preprocess(self, payload, state, height),
            TxPayload::NameRevoke(payload) => {
                names::revoke_preprocess(self, payload, state, height)
            }
        }
    }

    /// Apply the transaction to a snapshot, producing the successor
    /// snapshot. Assumes `preprocess` accepted the input; a failure here is
    /// a broken state invariant, not a protocol-level rejection.
    ///
    /// `config` carries the reward maturity the Coinbase kind locks its
    /// mint under; the other kinds do not consult it.
    pub fn apply(
        &self,
        state: &ChainState,
        height: Height,
        config: &ChainConfig,
    ) -> Result<ChainState, ChainError> {
        match &self.payload {
            TxPayload::Spend(payload) => spend::apply(self, payload, state, height),
            TxPayload::Coinbase(payload) => coinbase::apply(payload, state, height, config),
            TxPayload::OracleRegister(payload) => oracle::register_apply(self, payload, state, height),
            TxPayload::OracleQuery(payload) => oracle::query_apply(self, payload, state, height),
            TxPayload::OracleResponse(payload) => oracle::response_apply(self, payload, state, height),
            TxPayload::OracleExtend(payload) => oracle::extend_apply(self, payload, state, height),
            TxPayload::NamePreClaim(payload) => names::preclaim_apply(self, payload, state, height),
            TxPayload::NameClaim(payload) => names::claim_apply(self, payload, state, height),
            TxPayload::NameRevoke(payload) => names::revoke_apply(self, payload, state, height),
        }
    }
}

/// The sender of a signed kind. `static_valid` guarantees presence; this
/// exists for the per-kind modules.
pub(crate) fn require_sender(tx: &DataTx) -> Result<PublicKey, ChainError> {
    tx.sender
        .ok_or_else(|| ChainError::MalformedTx("missing sender".into()))
}

/// The sender's account with matured locked funds released, so preconditions
/// and effects see the same spendable balance.
pub(crate) fn spendable_account(
    state: &ChainState,
    key: &PublicKey,
    height: Height,
) -> Result<Account, ChainError> {
    state.account_or_empty(key)?.update_locked(height)
}

/// The shared tail of every signed kind's preprocess: the sender can cover
/// `required` and the nonce advances.
pub(crate) fn check_funds_and_nonce(
    state: &ChainState,
    tx: &DataTx,
    required: u64,
    height: Height,
) -> Result<(), ChainError> {
    let sender = require_sender(tx)?;
    let account = spendable_account(state, &sender, height)?;
    if account.balance < required {
        return Err(ChainError::InsufficientBalance {
            required,
            available: account.balance,
        });
    }
    if tx.nonce <= account.nonce {
        return Err(ChainError::NonceOutOfOrder {
            current: account.nonce,
            attempted: tx.nonce,
        });
    }
    Ok(())
}

/// The shared head of every signed kind's apply: debit `amount` and advance
/// the nonce, returning the updated snapshot.
pub(crate) fn debit_and_bump(
    state: &ChainState,
    tx: &DataTx,
    amount: u64,
    height: Height,
) -> Result<ChainState, ChainError> {
    let sender = require_sender(tx)?;
    let account = spendable_account(state, &sender, height)?
        .debit(amount)?
        .bump_nonce(tx.nonce)?;
    Ok(state.put_account(&sender, &account))
}
