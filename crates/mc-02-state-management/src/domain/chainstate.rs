//! The chain-state snapshot.
//!
//! Five sibling Merkle subtrees under one immutable value: accounts, oracle
//! registrations, oracle interactions, name commitments, and name claims.
//! Transitions clone the snapshot (cheap, structure-shared) and replace the
//! subtrees they touch.

use crate::domain::{Account, Interaction, MerkleTree, NameClaimRecord, NameCommitment, RegisteredOracle};
use shared_crypto::Keccak256Hasher;
use shared_types::{ChainError, Hash, Height, PublicKey};
use tracing::debug;

/// An immutable chain-state snapshot.
#[derive(Clone, Debug, Default)]
pub struct ChainState {
    /// Accounts, keyed by public key.
    pub accounts: MerkleTree,
    /// Registered oracles, keyed by owner public key.
    pub oracles: MerkleTree,
    /// Oracle interactions, keyed by derived query id.
    pub interactions: MerkleTree,
    /// Name pre-claim commitments, keyed by commitment hash.
    pub commitments: MerkleTree,
    /// Name claims, keyed by name hash.
    pub claims: MerkleTree,
}

impl ChainState {
    /// The genesis state: every subtree empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Root hash of the accounts subtree.
    pub fn accounts_root(&self) -> Hash {
        self.accounts.root_hash()
    }

    /// Combined state root committing to every subtree.
    pub fn root_hash(&self) -> Hash {
        let mut hasher = Keccak256Hasher::new();
        hasher
            .update(&self.accounts.root_hash())
            .update(&self.oracles.root_hash())
            .update(&self.interactions.root_hash())
            .update(&self.commitments.root_hash())
            .update(&self.claims.root_hash());
        hasher.finalize()
    }

    /// Sum of all holdings (spendable plus locked) across accounts. Supply
    /// conservation is stated over this quantity.
    pub fn total_supply(&self) -> Result<u64, ChainError> {
        self.accounts.fold(Ok(0u64), |acc, _, value| {
            let sum = acc?;
            let account = Account::from_rlp(value)?;
            sum.checked_add(account.total())
                .ok_or(ChainError::BalanceOverflow)
        })
    }

    // ---- accounts ----------------------------------------------------

    /// The account stored under `key`, if any.
    pub fn get_account(&self, key: &PublicKey) -> Result<Option<Account>, ChainError> {
        match self.accounts.lookup(key) {
            Some(bytes) => Ok(Some(Account::from_rlp(bytes)?)),
            None => Ok(None),
        }
    }

    /// The account under `key`, or a fresh empty account. Accounts are
    /// created lazily on first credit.
    pub fn account_or_empty(&self, key: &PublicKey) -> Result<Account, ChainError> {
        Ok(self.get_account(key)?.unwrap_or_else(Account::empty))
    }

    /// Store `account` under `key`, returning the new snapshot.
    pub fn put_account(&self, key: &PublicKey, account: &Account) -> Self {
        let mut next = self.clone();
        next.accounts = self.accounts.insert(*key, account.to_rlp());
        next
    }

    // ---- oracles -----------------------------------------------------

    /// The oracle registered under `owner`, if any.
    pub fn get_oracle(&self, owner: &PublicKey) -> Result<Option<RegisteredOracle>, ChainError> {
        match self.oracles.lookup(owner) {
            Some(bytes) => Ok(Some(RegisteredOracle::from_rlp(bytes)?)),
            None => Ok(None),
        }
    }

    /// Store an oracle registration.
    pub fn put_oracle(&self, oracle: &RegisteredOracle) -> Self {
        let mut next = self.clone();
        next.oracles = self.oracles.insert(oracle.owner, oracle.to_rlp());
        next
    }

    /// The interaction stored under `query_id`, if any.
    pub fn get_interaction(&self, query_id: &Hash) -> Result<Option<Interaction>, ChainError> {
        match self.interactions.lookup(query_id) {
            Some(bytes) => Ok(Some(Interaction::from_rlp(bytes)?)),
            None => Ok(None),
        }
    }

    /// Store an interaction under its query id.
    pub fn put_interaction(&self, query_id: &Hash, interaction: &Interaction) -> Self {
        let mut next = self.clone();
        next.interactions = self.interactions.insert(*query_id, interaction.to_rlp());
        next
    }

    // ---- naming ------------------------------------------------------

    /// The pre-claim commitment under `commitment_hash`, if any.
    pub fn get_commitment(
        &self,
        commitment_hash: &Hash,
    ) -> Result<Option<NameCommitment>, ChainError> {
        match self.commitments.lookup(commitment_hash) {
            Some(bytes) => Ok(Some(NameCommitment::from_rlp(bytes)?)),
            None => Ok(None),
        }
    }

    /// Store a pre-claim commitment.
    pub fn put_commitment(&self, commitment_hash: &Hash, commitment: &NameCommitment) -> Self {
        let mut next = self.clone();
        next.commitments = self.commitments.insert(*commitment_hash, commitment.to_rlp());
        next
    }

    /// Remove a pre-claim commitment.
    pub fn delete_commitment(&self, commitment_hash: &Hash) -> Self {
        let mut next = self.clone();
        next.commitments = self.commitments.delete(commitment_hash);
        next
    }

    /// The claim under `name_hash`, if any.
    pub fn get_claim(&self, name_hash: &Hash) -> Result<Option<NameClaimRecord>, ChainError> {
        match self.claims.lookup(name_hash) {
            Some(bytes) => Ok(Some(NameClaimRecord::from_rlp(bytes)?)),
            None => Ok(None),
        }
    }

    /// Store a claim under its name hash.
    pub fn put_claim(&self, name_hash: &Hash, claim: &NameClaimRecord) -> Self {
        let mut next = self.clone();
        next.claims = self.claims.insert(*name_hash, claim.to_rlp());
        next
    }

    /// Remove a claim.
    pub fn delete_claim(&self, name_hash: &Hash) -> Self {
        let mut next = self.clone();
        next.claims = self.claims.delete(name_hash);
        next
    }

    // ---- expiry sweeps -----------------------------------------------

    /// Remove oracle registrations whose expiry height has passed.
    /// Idempotent at a fixed height.
    pub fn expire_oracles(&self, height: Height) -> Result<Self, ChainError> {
        let expired = self.oracles.fold(
            Ok(Vec::new()),
            |acc: Result<Vec<PublicKey>, ChainError>, key, value| {
                let mut keys = acc?;
                if RegisteredOracle::from_rlp(value)?.expires_at < height {
                    keys.push(*key);
                }
                Ok(keys)
            },
        )?;
        let mut next = self.clone();
        for key in &expired {
            next.oracles = next.oracles.delete(key);
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), height, "swept expired oracles");
        }
        Ok(next)
    }

    /// Remove interactions whose response expiry has passed. Idempotent at
    /// a fixed height.
    pub fn expire_interactions(&self, height: Height) -> Result<Self, ChainError> {
        let expired = self.interactions.fold(
            Ok(Vec::new()),
            |acc: Result<Vec<Hash>, ChainError>, key, value| {
                let mut keys = acc?;
                if Interaction::from_rlp(value)?.response_expires_at < height {
                    keys.push(*key);
                }
                Ok(keys)
            },
        )?;
        let mut next = self.clone();
        for key in &expired {
            next.interactions = next.interactions.delete(key);
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), height, "swept expired interactions");
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OracleFormat;

    fn oracle(owner_byte: u8, expires_at: Height) -> RegisteredOracle {
        RegisteredOracle {
            owner: [owner_byte; 32],
            query_format: OracleFormat::Raw,
            response_format: OracleFormat::Raw,
            query_fee: 1,
            expires_at,
        }
    }

    #[test]
    fn test_account_round_trip_through_snapshot() {
        let key = [0x0Bu8; 32];
        let account = Account::empty().credit(77).unwrap();
        let state = ChainState::empty().put_account(&key, &account);

        assert_eq!(state.get_account(&key).unwrap(), Some(account));
        assert_eq!(ChainState::empty().get_account(&key).unwrap(), None);
    }

    #[test]
    fn test_root_hash_covers_every_subtree() {
        let base = ChainState::empty();
        let with_account =
            base.put_account(&[1u8; 32], &Account::empty().credit(1).unwrap());
        let with_claim = base.put_claim(
            &[2u8; 32],
            &NameClaimRecord {
                name: "alice".into(),
                owner: [1u8; 32],
                claimed_at: 1,
            },
        );
        assert_ne!(base.root_hash(), with_account.root_hash());
        assert_ne!(base.root_hash(), with_claim.root_hash());
        assert_ne!(with_account.root_hash(), with_claim.root_hash());
    }

    #[test]
    fn test_snapshots_are_independent() {
        let key = [9u8; 32];
        let base = ChainState::empty().put_account(&key, &Account::empty().credit(10).unwrap());
        let updated = base.put_account(&key, &Account::empty().credit(20).unwrap());

        assert_eq!(base.get_account(&key).unwrap().unwrap().balance, 10);
        assert_eq!(updated.get_account(&key).unwrap().unwrap().balance, 20);
    }

    #[test]
    fn test_expire_oracles_removes_only_past_expiry() {
        let state = ChainState::empty()
            .put_oracle(&oracle(1, 99))
            .put_oracle(&oracle(2, 100))
            .put_oracle(&oracle(3, 101));

        let swept = state.expire_oracles(100).unwrap();
        assert!(swept.get_oracle(&[1u8; 32]).unwrap().is_none());
        assert!(swept.get_oracle(&[2u8; 32]).unwrap().is_some());
        assert!(swept.get_oracle(&[3u8; 32]).unwrap().is_some());
    }

    #[test]
    fn test_expiry_is_idempotent() {
        let state = ChainState::empty()
            .put_oracle(&oracle(1, 5))
            .put_interaction(
                &[4u8; 32],
                &Interaction {
                    query: crate::domain::OracleQueryRecord {
                        querier: [1u8; 32],
                        oracle: [2u8; 32],
                        query_data: vec![],
                        query_fee: 0,
                    },
                    response: None,
                    query_expires_at: 4,
                    response_expires_at: 5,
                },
            );

        let once = state
            .expire_oracles(50)
            .unwrap()
            .expire_interactions(50)
            .unwrap();
        let twice = once
            .expire_oracles(50)
            .unwrap()
            .expire_interactions(50)
            .unwrap();
        assert_eq!(once.root_hash(), twice.root_hash());
        assert!(once.oracles.is_empty());
        assert!(once.interactions.is_empty());
    }

    #[test]
    fn test_total_supply_sums_spendable_and_locked() {
        let state = ChainState::empty()
            .put_account(&[1u8; 32], &Account::empty().credit(60).unwrap())
            .put_account(
                &[2u8; 32],
                &Account::empty().credit(40).unwrap().lock(15, 99).unwrap(),
            );
        assert_eq!(state.total_supply().unwrap(), 100);
    }
}
