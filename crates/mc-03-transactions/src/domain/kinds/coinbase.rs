//! Block-reward mint.
//!
//! Coinbase has no sender, no signature, and no fee; it credits the miner
//! and is the only kind allowed to grow the total supply. With a nonzero
//! `coinbase_maturity` the reward lands in the miner's locked schedule and
//! only matures into spendable balance `maturity` blocks later.

use crate::domain::payload::CoinbasePayload;
use mc_02_state_management::{Account, ChainState};
use shared_types::{ChainConfig, ChainError, Height};

/// Credit the block reward onto the miner's account.
pub fn reward(payload: &CoinbasePayload, account: Account) -> Result<Account, ChainError> {
    account.credit(payload.amount)
}

pub(crate) fn apply(
    payload: &CoinbasePayload,
    state: &ChainState,
    height: Height,
    config: &ChainConfig,
) -> Result<ChainState, ChainError> {
    let mut account = reward(payload, state.account_or_empty(&payload.receiver)?)?;
    if config.coinbase_maturity > 0 {
        account = account.lock(
            payload.amount,
            height.saturating_add(config.coinbase_maturity),
        )?;
    }
    Ok(state.put_account(&payload.receiver, &account))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CoinbasePayload {
        CoinbasePayload {
            receiver: [3u8; 32],
            amount: 10,
        }
    }

    #[test]
    fn test_reward_credits_receiver_without_touching_nonce() {
        let next = apply(&payload(), &ChainState::empty(), 1, &ChainConfig::default()).unwrap();
        let miner = next.get_account(&[3u8; 32]).unwrap().unwrap();
        assert_eq!(miner.balance, 10);
        assert_eq!(miner.nonce, 0);
        assert!(miner.locked.is_empty());
    }

    #[test]
    fn test_supply_grows_by_exactly_the_reward() {
        let base = ChainState::empty().put_account(
            &[1u8; 32],
            &Account::empty().credit(90).unwrap(),
        );
        let next = apply(&payload(), &base, 1, &ChainConfig::default()).unwrap();
        assert_eq!(
            next.total_supply().unwrap(),
            base.total_supply().unwrap() + 10
        );
    }

    #[test]
    fn test_nonzero_maturity_locks_the_reward() {
        let config = ChainConfig {
            coinbase_maturity: 100,
            ..ChainConfig::default()
        };
        let next = apply(&payload(), &ChainState::empty(), 7, &config).unwrap();
        let miner = next.get_account(&[3u8; 32]).unwrap().unwrap();

        assert_eq!(miner.balance, 0);
        assert_eq!(miner.locked.len(), 1);
        assert_eq!(miner.locked[0].amount, 10);
        assert_eq!(miner.locked[0].height, 107);
        // Locked coins still count toward the supply.
        assert_eq!(next.total_supply().unwrap(), 10);

        let matured = miner.update_locked(107).unwrap();
        assert_eq!(matured.balance, 10);
        assert!(matured.locked.is_empty());
    }
}
