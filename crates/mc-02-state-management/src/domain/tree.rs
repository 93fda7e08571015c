//! Persistent Merkle state tree.
//!
//! A binary search tree over `([u8; 32], bytes)` pairs, treap-balanced with
//! the heap priority derived as `keccak256(key)`. Priorities are a pure
//! function of the keys, so the tree shape, and with it the root hash, is
//! canonical for a given key set: insertion and deletion order cannot be
//! observed.
//!
//! Nodes are immutable and shared through `Arc`; `insert` and `delete`
//! return a new tree that shares every untouched subtree with its parent.
//! The empty tree's root hash is the distinguished all-zero constant.
//!
//! Node hash layout:
//! `keccak(0x01 ∥ key ∥ keccak(value) ∥ left_hash ∥ right_hash)`.

use crate::ports::KvStore;
use mc_01_codec::RlpItem;
use shared_crypto::{keccak256, Keccak256Hasher};
use shared_types::{ChainError, Hash, EMPTY_ROOT};
use std::cmp::Ordering;
use std::sync::Arc;

/// Fixed-width tree key: account public keys and derived identifiers.
pub type TreeKey = [u8; 32];

const NODE_DOMAIN: u8 = 0x01;

#[derive(Debug)]
struct Node {
    key: TreeKey,
    value: Vec<u8>,
    priority: Hash,
    hash: Hash,
    left: Option<Arc<Node>>,
    right: Option<Arc<Node>>,
}

fn child_hash(child: &Option<Arc<Node>>) -> Hash {
    child.as_ref().map_or(EMPTY_ROOT, |n| n.hash)
}

fn make_node(
    key: TreeKey,
    value: Vec<u8>,
    left: Option<Arc<Node>>,
    right: Option<Arc<Node>>,
) -> Arc<Node> {
    let mut hasher = Keccak256Hasher::new();
    hasher
        .update(&[NODE_DOMAIN])
        .update(&key)
        .update(&keccak256(&value))
        .update(&child_hash(&left))
        .update(&child_hash(&right));
    Arc::new(Node {
        priority: keccak256(&key),
        hash: hasher.finalize(),
        key,
        value,
        left,
        right,
    })
}

/// Persistent Merkle state tree.
#[derive(Clone, Debug, Default)]
pub struct MerkleTree {
    root: Option<Arc<Node>>,
    size: usize,
}

impl MerkleTree {
    /// The empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Root hash of the tree; all zeros when empty.
    pub fn root_hash(&self) -> Hash {
        child_hash(&self.root)
    }

    /// Number of key/value pairs.
    pub fn size(&self) -> usize {
        self.size
    }

    /// True when the tree holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Value stored under `key`, if any.
    pub fn lookup(&self, key: &TreeKey) -> Option<&[u8]> {
        let mut current = self.root.as_ref();
        while let Some(node) = current {
            match key.cmp(&node.key) {
                Ordering::Equal => return Some(&node.value),
                Ordering::Less => current = node.left.as_ref(),
                Ordering::Greater => current = node.right.as_ref(),
            }
        }
        None
    }

    /// True when `key` is present.
    pub fn contains(&self, key: &TreeKey) -> bool {
        self.lookup(key).is_some()
    }

    /// Insert `key → value`, replacing any existing value. Returns the new
    /// tree; the receiver is unchanged.
    pub fn insert(&self, key: TreeKey, value: Vec<u8>) -> Self {
        let (new_root, added) = insert_rec(self.root.as_ref(), &key, &value);
        Self {
            root: Some(new_root),
            size: self.size + usize::from(added),
        }
    }

    /// Remove `key` if present. Returns the new tree; the receiver is
    /// unchanged.
    pub fn delete(&self, key: &TreeKey) -> Self {
        let (new_root, removed) = delete_rec(self.root.as_ref(), key);
        if !removed {
            return self.clone();
        }
        Self {
            root: new_root,
            size: self.size - 1,
        }
    }

    /// Fold over the pairs in ascending key order.
    pub fn fold<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, &TreeKey, &[u8]) -> A,
    {
        let mut acc = init;
        for (key, value) in self.iter() {
            acc = f(acc, key, value);
        }
        acc
    }

    /// Iterator over the pairs in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(self.root.as_ref());
        iter
    }

    /// Rebuild the tree from its own sorted contents.
    ///
    /// The result is identical to the receiver for any tree produced by
    /// `insert`/`delete`; the operation exists so bulk-loaded trees can be
    /// brought to the canonical shape.
    pub fn rebalance(&self) -> Self {
        self.fold(Self::empty(), |acc, key, value| {
            acc.insert(*key, value.to_vec())
        })
    }

    /// Write every node reachable from the root into the store as one
    /// batch, keyed by node hash. Returns the root hash.
    pub fn persist(&self, store: &dyn KvStore) -> Result<Hash, ChainError> {
        let mut batch = Vec::with_capacity(self.size);
        collect_nodes(self.root.as_ref(), &mut batch);
        store.put_batch(batch)?;
        Ok(self.root_hash())
    }
}

fn insert_rec(node: Option<&Arc<Node>>, key: &TreeKey, value: &[u8]) -> (Arc<Node>, bool) {
    match node {
        None => (make_node(*key, value.to_vec(), None, None), true),
        Some(n) => match key.cmp(&n.key) {
            Ordering::Equal => (
                make_node(n.key, value.to_vec(), n.left.clone(), n.right.clone()),
                false,
            ),
            Ordering::Less => {
                let (new_left, added) = insert_rec(n.left.as_ref(), key, value);
                let rebuilt = make_node(n.key, n.value.clone(), Some(new_left), n.right.clone());
                (rotate_up_left(rebuilt), added)
            }
            Ordering::Greater => {
                let (new_right, added) = insert_rec(n.right.as_ref(), key, value);
                let rebuilt = make_node(n.key, n.value.clone(), n.left.clone(), Some(new_right));
                (rotate_up_right(rebuilt), added)
            }
        },
    }
}

/// Restore the heap property when the left child outranks the node.
fn rotate_up_left(node: Arc<Node>) -> Arc<Node> {
    match node.left.clone() {
        Some(left) if left.priority > node.priority => {
            let new_right = make_node(
                node.key,
                node.value.clone(),
                left.right.clone(),
                node.right.clone(),
            );
            make_node(left.key, left.value.clone(), left.left.clone(), Some(new_right))
        }
        _ => node,
    }
}

/// Restore the heap property when the right child outranks the node.
fn rotate_up_right(node: Arc<Node>) -> Arc<Node> {
    match node.right.clone() {
        Some(right) if right.priority > node.priority => {
            let new_left = make_node(
                node.key,
                node.value.clone(),
                node.left.clone(),
                right.left.clone(),
            );
            make_node(right.key, right.value.clone(), Some(new_left), right.right.clone())
        }
        _ => node,
    }
}

fn delete_rec(node: Option<&Arc<Node>>, key: &TreeKey) -> (Option<Arc<Node>>, bool) {
    match node {
        None => (None, false),
        Some(n) => match key.cmp(&n.key) {
            Ordering::Less => {
                let (new_left, removed) = delete_rec(n.left.as_ref(), key);
                if !removed {
                    return (Some(n.clone()), false);
                }
                (
                    Some(make_node(n.key, n.value.clone(), new_left, n.right.clone())),
                    true,
                )
            }
            Ordering::Greater => {
                let (new_right, removed) = delete_rec(n.right.as_ref(), key);
                if !removed {
                    return (Some(n.clone()), false);
                }
                (
                    Some(make_node(n.key, n.value.clone(), n.left.clone(), new_right)),
                    true,
                )
            }
            Ordering::Equal => (merge(n.left.clone(), n.right.clone()), true),
        },
    }
}

/// Join two treaps where every key on the left is below every key on the
/// right.
fn merge(left: Option<Arc<Node>>, right: Option<Arc<Node>>) -> Option<Arc<Node>> {
    match (left, right) {
        (None, other) | (other, None) => other,
        (Some(l), Some(r)) => {
            if l.priority > r.priority {
                Some(make_node(
                    l.key,
                    l.value.clone(),
                    l.left.clone(),
                    merge(l.right.clone(), Some(r)),
                ))
            } else {
                Some(make_node(
                    r.key,
                    r.value.clone(),
                    merge(Some(l), r.left.clone()),
                    r.right.clone(),
                ))
            }
        }
    }
}

fn collect_nodes(node: Option<&Arc<Node>>, batch: &mut Vec<(Vec<u8>, Vec<u8>)>) {
    if let Some(n) = node {
        let encoded = RlpItem::List(vec![
            RlpItem::bytes(&n.key),
            RlpItem::bytes(&n.value),
            RlpItem::bytes(&child_hash(&n.left)),
            RlpItem::bytes(&child_hash(&n.right)),
        ])
        .encode();
        batch.push((n.hash.to_vec(), encoded));
        collect_nodes(n.left.as_ref(), batch);
        collect_nodes(n.right.as_ref(), batch);
    }
}

/// In-order iterator over tree pairs.
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn push_left_spine(&mut self, mut node: Option<&'a Arc<Node>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_ref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a TreeKey, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_ref());
        Some((&node.key, node.value.as_slice()))
    }
}
