//! Merkle root computation over transaction hashes.
//!
//! Behavior:
//! - An empty list of leaves yields the all-zero hash (`Hash::zero()`).
//! - Odd layers are padded by duplicating the last node before hashing.
//! - Reduction is performed in-place to minimize allocations.

use crate::codec::Encode;
use crate::model::{Transaction, TransactionExt};
use crate::types::hash::Hash;

const EMPTY_ROOT: Hash = Hash::zero();
const MERKLE_NODE_SEPARATION: &[u8] = b"LEDGER_MERKLE_NODE";

/// Builds Merkle roots from leaf hashes, transactions, or extensions.
///
/// All three entry points produce the same root for the same transaction
/// sequence; they differ only in where the leaf hashes come from.
pub struct MerkleTree;

impl MerkleTree {
    fn hash_pair(left: Hash, right: Hash) -> Hash {
        let mut h = Hash::sha3();
        h.update(MERKLE_NODE_SEPARATION);
        h.update(left.as_slice());
        h.update(right.as_slice());
        h.finalize()
    }

    /// Computes a Merkle root from the provided leaf hashes.
    ///
    /// Leaf order determines the root; permuting the leaves changes it.
    /// Returns the zero hash when `nodes` is empty.
    pub fn root_from_hashes(mut nodes: Vec<Hash>) -> Hash {
        if nodes.is_empty() {
            return EMPTY_ROOT;
        }

        let mut len = nodes.len();

        while len > 1 {
            let mut write = 0;
            let mut read = 0;

            while read < len {
                let left = nodes[read];
                let right = if read + 1 < len {
                    nodes[read + 1]
                } else {
                    left
                };

                nodes[write] = Self::hash_pair(left, right);

                write += 1;
                read += 2;
            }

            len = write;
        }

        nodes[0]
    }

    /// Computes a Merkle root from plain transactions, hashing each one by
    /// encoding straight into the hasher.
    ///
    /// Returns the zero hash when `txs` is empty.
    pub fn root_from_transactions(txs: &[Transaction]) -> Hash {
        if txs.is_empty() {
            return EMPTY_ROOT;
        }

        let mut nodes = Vec::with_capacity(txs.len());
        for tx in txs {
            let mut h = Hash::sha3();
            tx.encode(&mut h);
            nodes.push(h.finalize());
        }

        Self::root_from_hashes(nodes)
    }

    /// Computes a Merkle root from extensions, reusing their cached content
    /// hashes. No transaction is re-encoded or re-hashed.
    ///
    /// Returns the zero hash when `txxs` is empty.
    pub fn root_from_extensions(txxs: &[TransactionExt]) -> Hash {
        if txxs.is_empty() {
            return EMPTY_ROOT;
        }
        Self::root_from_hashes(txxs.iter().map(|txx| txx.hash()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::fixtures::test_transaction;

    fn hash_leaf(data: &[u8]) -> Hash {
        Hash::digest(data)
    }

    #[test]
    fn empty_returns_zero_hash() {
        assert_eq!(MerkleTree::root_from_hashes(Vec::new()), Hash::zero());
        assert_eq!(MerkleTree::root_from_transactions(&[]), Hash::zero());
        assert_eq!(MerkleTree::root_from_extensions(&[]), Hash::zero());
    }

    #[test]
    fn single_leaf_returns_leaf() {
        let leaf = hash_leaf(b"leaf");
        assert_eq!(MerkleTree::root_from_hashes(vec![leaf]), leaf);
    }

    #[test]
    fn even_number_of_leaves_matches_manual_reduction() {
        let a = hash_leaf(b"a");
        let b = hash_leaf(b"b");
        let c = hash_leaf(b"c");
        let d = hash_leaf(b"d");

        let level1 = [MerkleTree::hash_pair(a, b), MerkleTree::hash_pair(c, d)];
        let expected_root = MerkleTree::hash_pair(level1[0], level1[1]);

        assert_eq!(MerkleTree::root_from_hashes(vec![a, b, c, d]), expected_root);
    }

    #[test]
    fn odd_number_of_leaves_duplicates_last_for_padding() {
        let a = hash_leaf(b"a");
        let b = hash_leaf(b"b");
        let c = hash_leaf(b"c");

        let left = MerkleTree::hash_pair(a, b);
        let right = MerkleTree::hash_pair(c, c);
        let expected_root = MerkleTree::hash_pair(left, right);

        assert_eq!(MerkleTree::root_from_hashes(vec![a, b, c]), expected_root);
    }

    #[test]
    fn leaf_order_changes_the_root() {
        let a = hash_leaf(b"a");
        let b = hash_leaf(b"b");
        assert_ne!(
            MerkleTree::root_from_hashes(vec![a, b]),
            MerkleTree::root_from_hashes(vec![b, a])
        );
    }

    #[test]
    fn all_three_entry_points_agree() {
        let mut second = test_transaction();
        second.nonce += 1;
        let txs = vec![test_transaction(), second];

        let from_txs = MerkleTree::root_from_transactions(&txs);

        let txxs: Vec<TransactionExt> =
            txs.iter().map(|tx| TransactionExt::extend(tx.clone())).collect();
        let from_exts = MerkleTree::root_from_extensions(&txxs);

        let hashes: Vec<Hash> = txs.iter().map(|tx| tx.content_hash()).collect();
        let from_hashes = MerkleTree::root_from_hashes(hashes);

        assert_eq!(from_txs, from_exts);
        assert_eq!(from_txs, from_hashes);
    }
}
