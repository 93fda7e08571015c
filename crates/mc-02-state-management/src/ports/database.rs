//! Key/value persistence abstraction.

use shared_types::ChainError;

/// Opaque key/value store backing the Merkle trees.
///
/// Commits happen per block: the tree hands the store one batch covering
/// every node of the new snapshot, and the store must apply it atomically,
/// so a crash mid-commit leaves the previous snapshot intact.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ChainError>;

    /// Write one key/value pair.
    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<(), ChainError>;

    /// Write a batch of pairs atomically.
    fn put_batch(&self, pairs: Vec<(Vec<u8>, Vec<u8>)>) -> Result<(), ChainError>;
}
