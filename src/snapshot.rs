//! Owned, serializable views of a tree.
use alloc::boxed::Box;

use crate::{AvlTree, KeyShape, Node};

/// A copy of a subtree, detached from the tree it was taken from.
///
/// Two snapshots are equal exactly when the trees they were taken from have the same shape, keys,
/// display values and heights.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NodeSnapshot<K> {
    pub key: K,
    pub display: Option<K>,
    pub height: u32,
    /// `h(left) - h(right)`.
    pub balance: i32,
    pub left: Option<Box<NodeSnapshot<K>>>,
    pub right: Option<Box<NodeSnapshot<K>>>,
}

impl<K: Clone> NodeSnapshot<K> {
    fn of(node: &Node<K>) -> NodeSnapshot<K> {
        NodeSnapshot {
            key: node.key().clone(),
            display: node.display().cloned(),
            height: node.height(),
            balance: node.balance_factor(),
            left: node.left().map(|left| Box::new(NodeSnapshot::of(left))),
            right: node.right().map(|right| Box::new(NodeSnapshot::of(right))),
        }
    }
}

/// Structural statistics of a tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Stats {
    pub node_count: usize,
    pub height: u32,
    /// The smallest height any binary tree of `node_count` nodes can have.
    pub min_height: u32,
}

/// Returns `⌈log2(n + 1)⌉`, the height of a perfectly balanced binary tree holding `n` nodes.
///
/// This is a report value only; it says nothing about whether a given tree is valid.
pub const fn min_height(n: usize) -> u32 {
    usize::BITS - n.leading_zeros()
}

impl<S: KeyShape> AvlTree<S> {
    /// Returns a copy of the whole tree, or `None` if it is empty.
    pub fn snapshot(&self) -> Option<NodeSnapshot<S::Key>> {
        self.root().map(NodeSnapshot::of)
    }

    /// Returns `⌈log2(len + 1)⌉`.
    pub fn min_height(&self) -> u32 {
        min_height(self.len())
    }

    pub fn stats(&self) -> Stats {
        Stats {
            node_count: self.len(),
            height: self.height(),
            min_height: self.min_height(),
        }
    }
}
