//! The account model.
//!
//! Pure, total state-update primitives over a single account value. The
//! caller (the transaction variant's `apply`) composes them; nothing here
//! touches trees or I/O.

use mc_01_codec::{CodecError, RlpItem, TxTag, WIRE_VERSION};
use serde::{Deserialize, Serialize};
use shared_types::{ChainError, Height};

/// Coins locked until a maturity height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedCoins {
    /// Height at which the coins mature into the spendable balance.
    pub height: Height,
    /// Locked amount.
    pub amount: u64,
}

/// A ledger account: spendable balance, replay-protection nonce, and the
/// locked-funds schedule, kept sorted by maturity height.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Spendable balance.
    pub balance: u64,
    /// Highest transaction nonce applied so far.
    pub nonce: u64,
    /// Locked entries, ascending by height.
    pub locked: Vec<LockedCoins>,
}

impl Account {
    /// A fresh account: zero balance, zero nonce, nothing locked.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add `amount` to the spendable balance.
    pub fn credit(mut self, amount: u64) -> Result<Self, ChainError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(ChainError::BalanceOverflow)?;
        Ok(self)
    }

    /// Remove `amount` from the spendable balance.
    pub fn debit(mut self, amount: u64) -> Result<Self, ChainError> {
        if amount > self.balance {
            return Err(ChainError::InsufficientBalance {
                required: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(self)
    }

    /// Advance the nonce to `new_nonce`, which must be strictly greater.
    pub fn bump_nonce(mut self, new_nonce: u64) -> Result<Self, ChainError> {
        if new_nonce <= self.nonce {
            return Err(ChainError::NonceOutOfOrder {
                current: self.nonce,
                attempted: new_nonce,
            });
        }
        self.nonce = new_nonce;
        Ok(self)
    }

    /// Move `amount` from the spendable balance into the locked schedule
    /// until `until_height`.
    pub fn lock(mut self, amount: u64, until_height: Height) -> Result<Self, ChainError> {
        self = self.debit(amount)?;
        let at = self
            .locked
            .partition_point(|entry| entry.height <= until_height);
        self.locked.insert(
            at,
            LockedCoins {
                height: until_height,
                amount,
            },
        );
        Ok(self)
    }

    /// Release every locked entry that has matured at `current_height`.
    /// Idempotent for a fixed height.
    pub fn update_locked(mut self, current_height: Height) -> Result<Self, ChainError> {
        let still_locked: Vec<LockedCoins> = self
            .locked
            .iter()
            .copied()
            .filter(|entry| entry.height > current_height)
            .collect();
        let matured: u64 = self
            .locked
            .iter()
            .filter(|entry| entry.height <= current_height)
            .map(|entry| entry.amount)
            .sum();
        self.locked = still_locked;
        self.credit(matured)
    }

    /// Total holdings: spendable plus locked. Supply conservation is stated
    /// over this sum.
    pub fn total(&self) -> u64 {
        self.balance + self.locked.iter().map(|e| e.amount).sum::<u64>()
    }

    /// Canonical wire form: `[10, 1, balance, nonce, [[height, amount], …]]`.
    pub fn to_rlp(&self) -> Vec<u8> {
        let locked = self
            .locked
            .iter()
            .map(|entry| {
                RlpItem::List(vec![RlpItem::uint(entry.height), RlpItem::uint(entry.amount)])
            })
            .collect();
        RlpItem::List(vec![
            RlpItem::uint(TxTag::Account.as_u8() as u64),
            RlpItem::uint(WIRE_VERSION as u64),
            RlpItem::uint(self.balance),
            RlpItem::uint(self.nonce),
            RlpItem::List(locked),
        ])
        .encode()
    }

    /// Decode the canonical wire form.
    pub fn from_rlp(bytes: &[u8]) -> Result<Self, CodecError> {
        let item = RlpItem::decode(bytes)?;
        let fields = item.as_list()?;
        if fields.len() != 5 {
            return Err(CodecError::BadFieldCount {
                expected: 5,
                actual: fields.len(),
            });
        }
        let tag = fields[0].as_uint()?;
        if tag != TxTag::Account.as_u8() as u64 {
            return Err(CodecError::InvalidTag(tag));
        }
        let version = fields[1].as_uint()?;
        if version != WIRE_VERSION as u64 {
            return Err(CodecError::InvalidVersion(version));
        }
        let locked = fields[4]
            .as_list()?
            .iter()
            .map(|entry| {
                let pair = entry.as_list()?;
                if pair.len() != 2 {
                    return Err(CodecError::BadFieldCount {
                        expected: 2,
                        actual: pair.len(),
                    });
                }
                Ok(LockedCoins {
                    height: pair[0].as_uint()?,
                    amount: pair[1].as_uint()?,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;
        Ok(Self {
            balance: fields[2].as_uint()?,
            nonce: fields[3].as_uint()?,
            locked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_debit() {
        let account = Account::empty().credit(100).unwrap();
        assert_eq!(account.balance, 100);
        let account = account.debit(40).unwrap();
        assert_eq!(account.balance, 60);
    }

    #[test]
    fn test_debit_beyond_balance_fails() {
        let account = Account::empty().credit(10).unwrap();
        let err = account.debit(11).unwrap_err();
        assert_eq!(
            err,
            ChainError::InsufficientBalance {
                required: 11,
                available: 10
            }
        );
    }

    #[test]
    fn test_credit_overflow_fails() {
        let account = Account::empty().credit(u64::MAX).unwrap();
        assert_eq!(account.credit(1).unwrap_err(), ChainError::BalanceOverflow);
    }

    #[test]
    fn test_nonce_must_strictly_increase() {
        let account = Account::empty().bump_nonce(3).unwrap();
        assert_eq!(account.nonce, 3);
        let err = account.clone().bump_nonce(3).unwrap_err();
        assert_eq!(
            err,
            ChainError::NonceOutOfOrder {
                current: 3,
                attempted: 3
            }
        );
        assert!(account.bump_nonce(4).is_ok());
    }

    #[test]
    fn test_lock_and_mature() {
        let account = Account::empty()
            .credit(100)
            .unwrap()
            .lock(30, 50)
            .unwrap()
            .lock(20, 10)
            .unwrap();
        assert_eq!(account.balance, 50);
        assert_eq!(account.total(), 100);
        // Schedule is height-ordered.
        assert_eq!(account.locked[0].height, 10);

        let at_height_10 = account.clone().update_locked(10).unwrap();
        assert_eq!(at_height_10.balance, 70);
        assert_eq!(at_height_10.locked.len(), 1);

        let at_height_60 = account.update_locked(60).unwrap();
        assert_eq!(at_height_60.balance, 100);
        assert!(at_height_60.locked.is_empty());
    }

    #[test]
    fn test_update_locked_is_idempotent() {
        let account = Account::empty().credit(9).unwrap().lock(4, 5).unwrap();
        let once = account.update_locked(5).unwrap();
        let twice = once.clone().update_locked(5).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rlp_round_trip() {
        let account = Account {
            balance: 59,
            nonce: 1,
            locked: vec![LockedCoins {
                height: 12,
                amount: 7,
            }],
        };
        let decoded = Account::from_rlp(&account.to_rlp()).unwrap();
        assert_eq!(decoded, account);
    }

    #[test]
    fn test_rlp_rejects_wrong_tag() {
        let account = Account::empty();
        let mut bytes = account.to_rlp();
        // Tag byte sits right after the list header.
        bytes[1] = 99;
        assert!(Account::from_rlp(&bytes).is_err());
    }
}
