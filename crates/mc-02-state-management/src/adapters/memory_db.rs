//! In-memory implementation of the KV port for tests and tooling.

use crate::ports::KvStore;
use shared_types::ChainError;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory key/value store.
pub struct MemoryKvStore {
    entries: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKvStore {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ChainError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ChainError::StorageError("lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<(), ChainError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ChainError::StorageError("lock poisoned".into()))?;
        entries.insert(key, value);
        Ok(())
    }

    fn put_batch(&self, pairs: Vec<(Vec<u8>, Vec<u8>)>) -> Result<(), ChainError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ChainError::StorageError("lock poisoned".into()))?;
        for (key, value) in pairs {
            entries.insert(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MerkleTree;

    #[test]
    fn test_store_operations() {
        let store = MemoryKvStore::new();
        store.put(vec![1], vec![0xAA]).unwrap();
        assert_eq!(store.get(&[1]).unwrap(), Some(vec![0xAA]));
        assert_eq!(store.get(&[2]).unwrap(), None);

        store
            .put_batch(vec![(vec![2], vec![0xBB]), (vec![3], vec![0xCC])])
            .unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_tree_persists_every_node() {
        let tree = (0u8..10).fold(MerkleTree::empty(), |t, i| t.insert([i; 32], vec![i]));
        let store = MemoryKvStore::new();

        let root = tree.persist(&store).unwrap();
        assert_eq!(root, tree.root_hash());
        assert_eq!(store.len(), tree.size());
        assert!(store.get(&root).unwrap().is_some());
    }
}
