//! Token transfer.

use super::{check_funds_and_nonce, debit_and_bump};
use crate::domain::payload::{DataTx, SpendPayload};
use mc_02_state_management::ChainState;
use shared_types::{ChainConfig, ChainError, Height};

pub(crate) fn static_valid(payload: &SpendPayload, config: &ChainConfig) -> Result<(), ChainError> {
    if payload.version != config.spend_tx_version {
        return Err(ChainError::MalformedTx(format!(
            "spend version {} does not match protocol version {}",
            payload.version, config.spend_tx_version
        )));
    }
    Ok(())
}

pub(crate) fn preprocess(
    tx: &DataTx,
    payload: &SpendPayload,
    state: &ChainState,
    height: Height,
) -> Result<(), ChainError> {
    let required = payload
        .amount
        .checked_add(tx.fee)
        .ok_or(ChainError::BalanceOverflow)?;
    check_funds_and_nonce(state, tx, required, height)
}

/// Debit the sender by `amount + fee`, advance its nonce, credit the
/// receiver by `amount`. Sender and receiver may coincide; the net effect
/// is then the fee burn alone.
pub(crate) fn apply(
    tx: &DataTx,
    payload: &SpendPayload,
    state: &ChainState,
    height: Height,
) -> Result<ChainState, ChainError> {
    let debited = debit_and_bump(state, tx, payload.amount + tx.fee, height)?;
    let receiver = debited
        .account_or_empty(&payload.receiver)?
        .credit(payload.amount)?;
    Ok(debited.put_account(&payload.receiver, &receiver))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payload::TxPayload;

    fn spend_tx(amount: u64, fee: u64, nonce: u64) -> (DataTx, SpendPayload) {
        let payload = SpendPayload {
            receiver: [2u8; 32],
            amount,
            version: 1,
        };
        let tx = DataTx::new(TxPayload::Spend(payload.clone()), [1u8; 32], fee, nonce);
        (tx, payload)
    }

    fn state_with_sender(balance: u64) -> ChainState {
        ChainState::empty().put_account(
            &[1u8; 32],
            &mc_02_state_management::Account::empty().credit(balance).unwrap(),
        )
    }

    #[test]
    fn test_version_mismatch_is_malformed() {
        let payload = SpendPayload {
            receiver: [2u8; 32],
            amount: 1,
            version: 9,
        };
        let err = static_valid(&payload, &ChainConfig::default()).unwrap_err();
        assert!(matches!(err, ChainError::MalformedTx(_)));
    }

    #[test]
    fn test_transfer_moves_amount_and_burns_fee() {
        let (tx, payload) = spend_tx(40, 1, 1);
        let state = state_with_sender(100);
        preprocess(&tx, &payload, &state, 1).unwrap();
        let next = apply(&tx, &payload, &state, 1).unwrap();

        let sender = next.get_account(&[1u8; 32]).unwrap().unwrap();
        let receiver = next.get_account(&[2u8; 32]).unwrap().unwrap();
        assert_eq!(sender.balance, 59);
        assert_eq!(sender.nonce, 1);
        assert_eq!(receiver.balance, 40);
        assert_eq!(receiver.nonce, 0);
    }

    #[test]
    fn test_insufficient_balance_reports_requirement() {
        let (tx, payload) = spend_tx(200, 1, 1);
        let state = state_with_sender(100);
        let err = preprocess(&tx, &payload, &state, 1).unwrap_err();
        assert_eq!(
            err,
            ChainError::InsufficientBalance {
                required: 201,
                available: 100
            }
        );
    }

    #[test]
    fn test_self_spend_burns_only_the_fee() {
        let payload = SpendPayload {
            receiver: [1u8; 32],
            amount: 30,
            version: 1,
        };
        let tx = DataTx::new(TxPayload::Spend(payload.clone()), [1u8; 32], 2, 1);
        let state = state_with_sender(100);
        let next = apply(&tx, &payload, &state, 1).unwrap();

        let account = next.get_account(&[1u8; 32]).unwrap().unwrap();
        assert_eq!(account.balance, 98);
        assert_eq!(account.nonce, 1);
    }

    #[test]
    fn test_matured_locked_funds_are_spendable() {
        let account = mc_02_state_management::Account::empty()
            .credit(50)
            .unwrap()
            .lock(30, 10)
            .unwrap();
        let state = ChainState::empty().put_account(&[1u8; 32], &account);
        let (tx, payload) = spend_tx(40, 1, 1);

        // Below maturity the locked 30 cannot be spent.
        assert!(preprocess(&tx, &payload, &state, 5).is_err());
        // At maturity it can.
        preprocess(&tx, &payload, &state, 10).unwrap();
        let next = apply(&tx, &payload, &state, 10).unwrap();
        assert_eq!(next.get_account(&[1u8; 32]).unwrap().unwrap().balance, 9);
    }
}
