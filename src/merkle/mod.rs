//! Merkle tree construction and diffing over block-hash sequences
//!
//! The tree summarizes an ordered sequence of leaf hashes so that two
//! document versions can be compared cheaply: equal roots mean identical
//! content, and a leaf-level diff pinpoints the changed blocks without ever
//! touching block bytes.

use sha2::{Digest, Sha256};

/// A Merkle tree built from an ordered sequence of leaf hashes
///
/// Construction is a pure function of the leaf sequence: the same leaves
/// always produce the same tree, and the tree is never mutated afterwards.
/// An empty leaf sequence produces a tree with no root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    leaves: Vec<String>,
    levels: Vec<Vec<String>>,
}

impl MerkleTree {
    /// Builds a tree from an ordered sequence of leaf hashes
    ///
    /// Level 0 is the leaf sequence itself. Each subsequent level combines
    /// adjacent pairs with a binary hash; an odd trailing node is paired
    /// with itself rather than promoted unpaired. Construction repeats
    /// until a single root node remains.
    pub fn build(leaves: Vec<String>) -> Self {
        let mut levels = Vec::new();
        if !leaves.is_empty() {
            levels.push(leaves.clone());
            let mut current = leaves.clone();
            while current.len() > 1 {
                let mut next = Vec::with_capacity((current.len() + 1) / 2);
                for pair in current.chunks(2) {
                    match pair {
                        [left, right] => next.push(hash_pair(left, right)),
                        [odd] => next.push(hash_pair(odd, odd)),
                        _ => unreachable!(),
                    }
                }
                levels.push(next.clone());
                current = next;
            }
        }
        Self { leaves, levels }
    }

    /// Returns the root hash, or `None` for an empty tree
    ///
    /// Callers must handle the empty case explicitly; there is no valid
    /// hash for zero leaves.
    pub fn root(&self) -> Option<&str> {
        self.levels.last().and_then(|l| l.first()).map(|s| s.as_str())
    }

    /// Returns the leaf-hash sequence this tree was built from
    pub fn leaves(&self) -> &[String] {
        &self.leaves
    }

    /// Computes the leaf hashes that differ from another tree
    ///
    /// This is a positional diff: leaves are compared index-by-index up to
    /// the shorter sequence's length, and any leaves beyond that length (on
    /// either side) are unconditionally reported as changed. Reordering the
    /// same blocks therefore reports a change at every shifted position —
    /// an accepted property of the scheme, not something callers should
    /// compensate for.
    ///
    /// Positions that differ report `self`'s hash; positions that exist
    /// only in `other` report `other`'s hash.
    pub fn diff(&self, other: &MerkleTree) -> Vec<String> {
        let mut diffs = Vec::new();
        let shared = self.leaves.len().min(other.leaves.len());
        for i in 0..shared {
            if self.leaves[i] != other.leaves[i] {
                diffs.push(self.leaves[i].clone());
            }
        }
        for leaf in &self.leaves[shared..] {
            diffs.push(leaf.clone());
        }
        for leaf in &other.leaves[shared..] {
            diffs.push(leaf.clone());
        }
        diffs
    }
}

/// Hashes the concatenation of two child hashes into a parent node
fn hash_pair(left: &str, right: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    hex::encode(hasher.finalize())
}
