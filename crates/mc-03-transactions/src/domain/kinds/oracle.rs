//! The oracle subsystem's four operations.
//!
//! Register creates a record keyed by the sender; Query escrows a fee into
//! a derived interaction; Response releases the escrow to the oracle;
//! Extend pushes the registration's expiry out.

use super::{check_funds_and_nonce, debit_and_bump, require_sender};
use crate::domain::payload::{
    DataTx, OracleExtendPayload, OracleQueryPayload, OracleRegisterPayload, OracleResponsePayload,
};
use mc_02_state_management::{ChainState, Interaction, OracleQueryRecord, RegisteredOracle};
use shared_crypto::Keccak256Hasher;
use shared_types::{ChainError, Hash, Height, PublicKey, Ttl};

/// Deterministic interaction key: `keccak(sender ∥ nonce_be ∥ oracle)`.
pub fn derive_query_id(sender: &PublicKey, nonce: u64, oracle: &PublicKey) -> Hash {
    let mut hasher = Keccak256Hasher::new();
    hasher
        .update(sender)
        .update(&nonce.to_be_bytes())
        .update(oracle);
    hasher.finalize()
}

// ---- register --------------------------------------------------------

pub(crate) fn register_preprocess(
    tx: &DataTx,
    _payload: &OracleRegisterPayload,
    state: &ChainState,
    height: Height,
) -> Result<(), ChainError> {
    let sender = require_sender(tx)?;
    if state.get_oracle(&sender)?.is_some() {
        return Err(ChainError::OracleStateConflict(
            "sender is already a registered oracle".into(),
        ));
    }
    check_funds_and_nonce(state, tx, tx.fee, height)
}

pub(crate) fn register_apply(
    tx: &DataTx,
    payload: &OracleRegisterPayload,
    state: &ChainState,
    height: Height,
) -> Result<ChainState, ChainError> {
    let sender = require_sender(tx)?;
    let next = debit_and_bump(state, tx, tx.fee, height)?;
    Ok(next.put_oracle(&RegisteredOracle {
        owner: sender,
        query_format: payload.query_format,
        response_format: payload.response_format,
        query_fee: payload.query_fee,
        expires_at: payload.ttl.expiry_height(height),
    }))
}

// ---- query -----------------------------------------------------------

pub(crate) fn query_static_valid(payload: &OracleQueryPayload) -> Result<(), ChainError> {
    match payload.response_ttl {
        Ttl::Relative(_) => Ok(()),
        Ttl::Absolute(_) => Err(ChainError::MalformedTx(
            "oracle query response TTL must be relative".into(),
        )),
    }
}

pub(crate) fn query_preprocess(
    tx: &DataTx,
    payload: &OracleQueryPayload,
    state: &ChainState,
    height: Height,
) -> Result<(), ChainError> {
    let sender = require_sender(tx)?;
    let oracle = state
        .get_oracle(&payload.oracle)?
        .ok_or(ChainError::UnknownOracle)?;
    oracle.query_format.conforms(&payload.query_data)?;
    if payload.query_fee < oracle.query_fee {
        return Err(ChainError::OracleStateConflict(format!(
            "query fee {} below the oracle's price {}",
            payload.query_fee, oracle.query_fee
        )));
    }
    let query_id = derive_query_id(&sender, tx.nonce, &payload.oracle);
    if state.get_interaction(&query_id)?.is_some() {
        return Err(ChainError::OracleStateConflict(
            "query id already exists".into(),
        ));
    }
    let required = tx
        .fee
        .checked_add(payload.query_fee)
        .ok_or(ChainError::BalanceOverflow)?;
    check_funds_and_nonce(state, tx, required, height)
}

pub(crate) fn query_apply(
    tx: &DataTx,
    payload: &OracleQueryPayload,
    state: &ChainState,
    height: Height,
) -> Result<ChainState, ChainError> {
    let sender = require_sender(tx)?;
    let next = debit_and_bump(state, tx, tx.fee + payload.query_fee, height)?;
    let query_id = derive_query_id(&sender, tx.nonce, &payload.oracle);
    let query_expires_at = payload.query_ttl.expiry_height(height);
    Ok(next.put_interaction(
        &query_id,
        &Interaction {
            query: OracleQueryRecord {
                querier: sender,
                oracle: payload.oracle,
                query_data: payload.query_data.clone(),
                query_fee: payload.query_fee,
            },
            response: None,
            query_expires_at,
            response_expires_at: query_expires_at
                .saturating_add(payload.response_ttl.value()),
        },
    ))
}

// ---- response --------------------------------------------------------

pub(crate) fn response_preprocess(
    tx: &DataTx,
    payload: &OracleResponsePayload,
    state: &ChainState,
    height: Height,
) -> Result<(), ChainError> {
    let sender = require_sender(tx)?;
    let interaction = state
        .get_interaction(&payload.query_id)?
        .ok_or_else(|| ChainError::OracleStateConflict("no such query".into()))?;
    if interaction.response.is_some() {
        return Err(ChainError::OracleStateConflict(
            "query already answered".into(),
        ));
    }
    if interaction.query.oracle != sender {
        return Err(ChainError::OracleStateConflict(
            "responder is not the queried oracle".into(),
        ));
    }
    let oracle = state.get_oracle(&sender)?.ok_or(ChainError::UnknownOracle)?;
    oracle.response_format.conforms(&payload.response_data)?;
    check_funds_and_nonce(state, tx, tx.fee, height)
}

pub(crate) fn response_apply(
    tx: &DataTx,
    payload: &OracleResponsePayload,
    state: &ChainState,
    height: Height,
) -> Result<ChainState, ChainError> {
    let sender = require_sender(tx)?;
    let mut interaction = state
        .get_interaction(&payload.query_id)?
        .ok_or_else(|| ChainError::OracleStateConflict("no such query".into()))?;
    interaction.response = Some(payload.response_data.clone());
    let escrow = interaction.query.query_fee;

    let next = debit_and_bump(state, tx, tx.fee, height)?;
    let responder = next.account_or_empty(&sender)?.credit(escrow)?;
    Ok(next
        .put_account(&sender, &responder)
        .put_interaction(&payload.query_id, &interaction))
}

// ---- extend ----------------------------------------------------------

pub(crate) fn extend_static_valid(payload: &OracleExtendPayload) -> Result<(), ChainError> {
    match payload.ttl {
        Ttl::Relative(_) => Ok(()),
        Ttl::Absolute(_) => Err(ChainError::MalformedTx(
            "oracle extension TTL must be relative".into(),
        )),
    }
}

pub(crate) fn extend_preprocess(
    tx: &DataTx,
    _payload: &OracleExtendPayload,
    state: &ChainState,
    height: Height,
) -> Result<(), ChainError> {
    let sender = require_sender(tx)?;
    if state.get_oracle(&sender)?.is_none() {
        return Err(ChainError::UnknownOracle);
    }
    check_funds_and_nonce(state, tx, tx.fee, height)
}

pub(crate) fn extend_apply(
    tx: &DataTx,
    payload: &OracleExtendPayload,
    state: &ChainState,
    height: Height,
) -> Result<ChainState, ChainError> {
    let sender = require_sender(tx)?;
    let mut oracle = state.get_oracle(&sender)?.ok_or(ChainError::UnknownOracle)?;
    oracle.expires_at = oracle.expires_at.saturating_add(payload.ttl.value());
    let next = debit_and_bump(state, tx, tx.fee, height)?;
    Ok(next.put_oracle(&oracle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payload::TxPayload;
    use mc_02_state_management::{Account, OracleFormat};

    const ORACLE: PublicKey = [0x0Fu8; 32];
    const QUERIER: PublicKey = [0x0Au8; 32];

    fn funded(state: ChainState, key: PublicKey, balance: u64) -> ChainState {
        state.put_account(&key, &Account::empty().credit(balance).unwrap())
    }

    fn registered_state() -> ChainState {
        let register = OracleRegisterPayload {
            query_format: OracleFormat::Utf8,
            response_format: OracleFormat::Utf8,
            query_fee: 5,
            ttl: Ttl::Relative(100),
        };
        let tx = DataTx::new(
            TxPayload::OracleRegister(register.clone()),
            ORACLE,
            1,
            1,
        );
        let state = funded(funded(ChainState::empty(), ORACLE, 50), QUERIER, 50);
        register_preprocess(&tx, &register, &state, 10).unwrap();
        register_apply(&tx, &register, &state, 10).unwrap()
    }

    #[test]
    fn test_register_creates_record_with_resolved_expiry() {
        let state = registered_state();
        let oracle = state.get_oracle(&ORACLE).unwrap().unwrap();
        assert_eq!(oracle.expires_at, 110);
        assert_eq!(oracle.query_fee, 5);
        assert_eq!(state.get_account(&ORACLE).unwrap().unwrap().balance, 49);
    }

    #[test]
    fn test_double_registration_conflicts() {
        let state = registered_state();
        let register = OracleRegisterPayload {
            query_format: OracleFormat::Raw,
            response_format: OracleFormat::Raw,
            query_fee: 1,
            ttl: Ttl::Relative(10),
        };
        let tx = DataTx::new(TxPayload::OracleRegister(register.clone()), ORACLE, 1, 2);
        let err = register_preprocess(&tx, &register, &state, 11).unwrap_err();
        assert!(matches!(err, ChainError::OracleStateConflict(_)));
    }

    fn query_payload() -> OracleQueryPayload {
        OracleQueryPayload {
            oracle: ORACLE,
            query_data: b"btc/usd?".to_vec(),
            query_fee: 5,
            query_ttl: Ttl::Relative(20),
            response_ttl: Ttl::Relative(10),
        }
    }

    #[test]
    fn test_query_escrows_fee_into_interaction() {
        let state = registered_state();
        let payload = query_payload();
        let tx = DataTx::new(TxPayload::OracleQuery(payload.clone()), QUERIER, 1, 1);
        query_preprocess(&tx, &payload, &state, 11).unwrap();
        let next = query_apply(&tx, &payload, &state, 11).unwrap();

        assert_eq!(next.get_account(&QUERIER).unwrap().unwrap().balance, 44);
        let query_id = derive_query_id(&QUERIER, 1, &ORACLE);
        let interaction = next.get_interaction(&query_id).unwrap().unwrap();
        assert_eq!(interaction.query.query_fee, 5);
        assert_eq!(interaction.response, None);
        assert_eq!(interaction.query_expires_at, 31);
        assert_eq!(interaction.response_expires_at, 41);
    }

    #[test]
    fn test_query_to_unknown_oracle_fails() {
        let state = funded(ChainState::empty(), QUERIER, 50);
        let payload = query_payload();
        let tx = DataTx::new(TxPayload::OracleQuery(payload.clone()), QUERIER, 1, 1);
        assert_eq!(
            query_preprocess(&tx, &payload, &state, 11).unwrap_err(),
            ChainError::UnknownOracle
        );
    }

    #[test]
    fn test_query_data_must_conform_to_format() {
        let state = registered_state();
        let mut payload = query_payload();
        payload.query_data = vec![0xFF, 0xFE];
        let tx = DataTx::new(TxPayload::OracleQuery(payload.clone()), QUERIER, 1, 1);
        let err = query_preprocess(&tx, &payload, &state, 11).unwrap_err();
        assert!(matches!(err, ChainError::SchemaMismatch(_)));
    }

    #[test]
    fn test_underpriced_query_fails() {
        let state = registered_state();
        let mut payload = query_payload();
        payload.query_fee = 2;
        let tx = DataTx::new(TxPayload::OracleQuery(payload.clone()), QUERIER, 1, 1);
        let err = query_preprocess(&tx, &payload, &state, 11).unwrap_err();
        assert!(matches!(err, ChainError::OracleStateConflict(_)));
    }

    #[test]
    fn test_response_cycle_releases_escrow_once() {
        let state = registered_state();
        let payload = query_payload();
        let query_tx = DataTx::new(TxPayload::OracleQuery(payload.clone()), QUERIER, 1, 1);
        let state = query_apply(&query_tx, &payload, &state, 11).unwrap();

        let query_id = derive_query_id(&QUERIER, 1, &ORACLE);
        let response = OracleResponsePayload {
            query_id,
            response_data: b"31000".to_vec(),
        };
        let response_tx = DataTx::new(TxPayload::OracleResponse(response.clone()), ORACLE, 1, 2);
        response_preprocess(&response_tx, &response, &state, 12).unwrap();
        let state = response_apply(&response_tx, &response, &state, 12).unwrap();

        // 49 after registration, -1 response fee, +5 escrow.
        assert_eq!(state.get_account(&ORACLE).unwrap().unwrap().balance, 53);
        let interaction = state.get_interaction(&query_id).unwrap().unwrap();
        assert_eq!(interaction.response.as_deref(), Some(b"31000".as_ref()));

        // A second response to the same query conflicts.
        let second = DataTx::new(TxPayload::OracleResponse(response.clone()), ORACLE, 1, 3);
        let err = response_preprocess(&second, &response, &state, 13).unwrap_err();
        assert!(matches!(err, ChainError::OracleStateConflict(_)));
    }

    #[test]
    fn test_response_from_wrong_oracle_fails() {
        let state = registered_state();
        let payload = query_payload();
        let query_tx = DataTx::new(TxPayload::OracleQuery(payload.clone()), QUERIER, 1, 1);
        let state = query_apply(&query_tx, &payload, &state, 11).unwrap();

        let response = OracleResponsePayload {
            query_id: derive_query_id(&QUERIER, 1, &ORACLE),
            response_data: b"31000".to_vec(),
        };
        let imposter = DataTx::new(TxPayload::OracleResponse(response.clone()), QUERIER, 1, 2);
        let err = response_preprocess(&imposter, &response, &state, 12).unwrap_err();
        assert!(matches!(err, ChainError::OracleStateConflict(_)));
    }

    #[test]
    fn test_extend_pushes_expiry_out() {
        let state = registered_state();
        let payload = OracleExtendPayload {
            ttl: Ttl::Relative(40),
        };
        let tx = DataTx::new(TxPayload::OracleExtend(payload.clone()), ORACLE, 1, 2);
        extend_preprocess(&tx, &payload, &state, 20).unwrap();
        let next = extend_apply(&tx, &payload, &state, 20).unwrap();
        assert_eq!(next.get_oracle(&ORACLE).unwrap().unwrap().expires_at, 150);
    }

    #[test]
    fn test_extend_requires_registration() {
        let state = funded(ChainState::empty(), QUERIER, 50);
        let payload = OracleExtendPayload {
            ttl: Ttl::Relative(40),
        };
        let tx = DataTx::new(TxPayload::OracleExtend(payload.clone()), QUERIER, 1, 1);
        assert_eq!(
            extend_preprocess(&tx, &payload, &state, 20).unwrap_err(),
            ChainError::UnknownOracle
        );
    }

    #[test]
    fn test_absolute_ttls_rejected_where_relative_required() {
        assert!(query_static_valid(&OracleQueryPayload {
            response_ttl: Ttl::Absolute(5),
            ..query_payload()
        })
        .is_err());
        assert!(extend_static_valid(&OracleExtendPayload {
            ttl: Ttl::Absolute(5),
        })
        .is_err());
    }

    #[test]
    fn test_query_id_is_deterministic_and_keyed_on_all_inputs() {
        let base = derive_query_id(&QUERIER, 1, &ORACLE);
        assert_eq!(base, derive_query_id(&QUERIER, 1, &ORACLE));
        assert_ne!(base, derive_query_id(&QUERIER, 2, &ORACLE));
        assert_ne!(base, derive_query_id(&ORACLE, 1, &ORACLE));
        assert_ne!(base, derive_query_id(&QUERIER, 1, &QUERIER));
    }
}
