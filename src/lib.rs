//! An owned AVL tree that reports the rotations each operation performs.
#![cfg_attr(not(feature = "std"), no_std)]

// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`. A missing subtree has height 0, a leaf height 1.
// - The balance factor of `x` is `h(left(x)) - h(right(x))`.
// - `x` is left-heavy if its balance factor is positive and right-heavy if it is negative.
//
// The fundamental invariants of an AVL tree are:
// 1. Every balance factor is -1, 0 or 1.
// 2. The cached height of every node is `1 + max(h(left), h(right))`.
//
// A single insertion changes the height of any subtree by at most one, so no balance factor ever
// exceeds 2 in magnitude before it is repaired. Heights are refreshed bottom-up while the
// recursion unwinds, so a child is always current by the time its parent reads it.

extern crate alloc;

use alloc::{boxed::Box, vec::Vec};
use core::{cmp::Ordering, fmt, marker::PhantomData, mem, ops::Not};

use tracing::{debug, trace};

mod error;
#[cfg(feature = "std")]
mod handle;
mod iter;
mod key;
mod rotation;
mod snapshot;
mod suggest;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use error::TreeError;
#[cfg(feature = "std")]
pub use handle::{Change, HandleConfig, Outcome, TreeHandle};
pub use iter::Iter;
pub use key::{CaseFolded, KeyShape, Natural, Normalized};
pub use rotation::{Rotation, RotationKind, Rotations};
pub use snapshot::{min_height, NodeSnapshot, Stats};
pub use suggest::Suggestion;

/// A tree of integer keys.
pub type NumberTree = AvlTree<Natural<i64>>;

/// A tree of case-insensitive words that remembers how each word was written.
pub type WordTree = AvlTree<CaseFolded>;

/// An AVL tree whose keys follow the rules of `S`.
///
/// Every node is exclusively owned by its parent. Insert and remove return the rotations they
/// applied, so callers can show how the tree rebalanced.
pub struct AvlTree<S: KeyShape> {
    root: Link<S::Key>,
    len: usize,
    _shape: PhantomData<fn() -> S>,
}

/// A node of an [`AvlTree`].
pub struct Node<K> {
    key: K,
    display: Option<K>,
    children: [Link<K>; 2],
    height: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Dir {
    // The side of a node that `ordering` points to when descending.
    fn of(ordering: Ordering) -> Option<Dir> {
        match ordering {
            Ordering::Less => Some(Dir::Left),
            Ordering::Equal => None,
            Ordering::Greater => Some(Dir::Right),
        }
    }
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

type Link<K> = Option<Box<Node<K>>>;

#[inline]
fn height<K>(link: &Link<K>) -> u32 {
    link.as_ref().map_or(0, |node| node.height)
}

impl<K> Node<K> {
    fn new(key: K, display: Option<K>) -> Box<Node<K>> {
        Box::new(Node {
            key,
            display,
            children: [None, None],
            height: 1,
        })
    }

    /// Returns the stored (normalized) key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns the form the key was supplied in, if it differs from the stored key.
    pub fn display(&self) -> Option<&K> {
        self.display.as_ref()
    }

    pub fn left(&self) -> Option<&Node<K>> {
        self.child(Dir::Left)
    }

    pub fn right(&self) -> Option<&Node<K>> {
        self.child(Dir::Right)
    }

    /// Returns the height of the subtree rooted at this node. Leaves have height 1.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `h(left) - h(right)`.
    pub fn balance_factor(&self) -> i32 {
        height(&self.children[Dir::Left as usize]) as i32
            - height(&self.children[Dir::Right as usize]) as i32
    }

    fn child(&self, dir: Dir) -> Option<&Node<K>> {
        self.children[dir as usize].as_deref()
    }

    fn take_child(&mut self, dir: Dir) -> Link<K> {
        self.children[dir as usize].take()
    }

    fn set_child(&mut self, dir: Dir, child: Link<K>) {
        self.children[dir as usize] = child;
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.children[0]).max(height(&self.children[1]));
    }

    // The side this node leans toward, if any.
    fn lean(&self) -> Option<Dir> {
        match self.balance_factor() {
            0 => None,
            bf if bf > 0 => Some(Dir::Left),
            _ => Some(Dir::Right),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Node<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("display", &self.display)
            .field("height", &self.height)
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}

// Performs a rotation, moving `down` down toward `dir` and its `!dir` child up into its place.
//
// The rising child's `dir` subtree moves across to become the `!dir` child of `down`. Heights of
// both nodes are refreshed, `down` first since it is now the child.
fn rotate<K: Clone + fmt::Debug>(
    mut down: Box<Node<K>>,
    dir: Dir,
    log: &mut Rotations<K>,
) -> Box<Node<K>> {
    let Some(mut up) = down.take_child(!dir) else {
        unreachable!("rotation requires a child on the rising side");
    };

    down.set_child(!dir, up.take_child(dir));
    down.update_height();

    let rotation = Rotation {
        kind: RotationKind::toward(dir),
        pivot: down.key.clone(),
        new_root: up.key.clone(),
    };

    up.set_child(dir, Some(down));
    up.update_height();

    trace!(kind = ?rotation.kind, pivot = ?rotation.pivot, new_root = ?rotation.new_root, "rotated");
    log.push(rotation);

    up
}

// Performs a double rotation at `node`: first its `!dir` child is rotated toward `!dir`, which
// straightens the zig-zag, then `node` is rotated toward `dir`.
fn rotate_twice<K: Clone + fmt::Debug>(
    mut node: Box<Node<K>>,
    dir: Dir,
    log: &mut Rotations<K>,
) -> Box<Node<K>> {
    let Some(inner) = node.take_child(!dir) else {
        unreachable!("double rotation requires a child on the rising side");
    };

    node.set_child(!dir, Some(rotate(inner, !dir, log)));
    rotate(node, dir, log)
}

// Restores the AVL property at `node` after a removal beneath it.
//
// Unlike insertion, the heavy child may be balanced, in which case a single rotation suffices.
fn rebalance_removed<K: Clone + fmt::Debug>(
    mut node: Box<Node<K>>,
    log: &mut Rotations<K>,
) -> Box<Node<K>> {
    node.update_height();

    let heavy = match node.balance_factor() {
        bf if bf > 1 => Dir::Left,
        bf if bf < -1 => Dir::Right,
        _ => return node,
    };

    let leans_inward = node
        .child(heavy)
        .and_then(Node::lean)
        .is_some_and(|lean| lean == !heavy);

    if leans_inward {
        rotate_twice(node, !heavy, log)
    } else {
        rotate(node, !heavy, log)
    }
}

impl<S: KeyShape> AvlTree<S> {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<S> {
        AvlTree {
            root: None,
            len: 0,
            _shape: PhantomData,
        }
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        let empty = self.len() == 0;
        debug_assert_eq!(empty, self.root.is_none());
        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree, or 0 if it is empty.
    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    /// Returns the root node.
    pub fn root(&self) -> Option<&Node<S::Key>> {
        self.root.as_deref()
    }

    /// Returns an in-order iterator over the nodes of the tree.
    pub fn iter(&self) -> Iter<'_, S::Key> {
        Iter::new(self.root.as_deref(), self.len)
    }

    /// Returns the node whose key compares equal to `key` once normalized.
    pub fn get(&self, key: S::Key) -> Option<&Node<S::Key>> {
        let probe = S::normalize(key).ok()?.key;
        let mut opt_cur = self.root.as_deref();

        loop {
            let cur = opt_cur?;

            match Dir::of(S::compare(&probe, &cur.key)) {
                Some(dir) => opt_cur = cur.child(dir),
                None => return Some(cur),
            }
        }
    }

    /// Returns `true` if the tree holds `key`.
    pub fn contains(&self, key: S::Key) -> bool {
        self.get(key).is_some()
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<&Node<S::Key>> {
        self.extreme(Dir::Left)
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<&Node<S::Key>> {
        self.extreme(Dir::Right)
    }

    fn extreme(&self, dir: Dir) -> Option<&Node<S::Key>> {
        let mut cur = self.root.as_deref()?;
        while let Some(next) = cur.child(dir) {
            cur = next;
        }
        Some(cur)
    }

    /// Inserts `key` into the tree, returning the rotations performed to rebalance it.
    ///
    /// If the key is already present the tree is left untouched and
    /// [`TreeError::DuplicateKey`] is returned.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: S::Key) -> Result<Rotations<S::Key>, TreeError> {
        let new = S::normalize(key)?;
        let probe = new.key.clone();

        let mut log = Vec::new();
        let len_before = self.len;

        let root = self.root.take();
        self.root = Some(self.insert_at(root, new, &probe, &mut log));

        if self.len == len_before {
            debug!(key = ?probe, "duplicate key not inserted");
            return Err(TreeError::DuplicateKey);
        }

        Ok(log)
    }

    /// Parses `text` with the tree's key shape and inserts the result.
    pub fn insert_str(&mut self, text: &str) -> Result<Rotations<S::Key>, TreeError> {
        let key = S::parse(text).inspect_err(|_| debug!(text, "rejected invalid key"))?;
        self.insert(key)
    }

    fn insert_at(
        &mut self,
        link: Link<S::Key>,
        new: Normalized<S::Key>,
        probe: &S::Key,
        log: &mut Rotations<S::Key>,
    ) -> Box<Node<S::Key>> {
        let Some(mut node) = link else {
            self.len += 1;
            return Node::new(new.key, new.display);
        };

        let Some(dir) = Dir::of(S::compare(probe, &node.key)) else {
            // Duplicate keys are not allowed.
            return node;
        };

        let child = node.take_child(dir);
        node.set_child(dir, Some(self.insert_at(child, new, probe, log)));
        node.update_height();

        let heavy = match node.balance_factor() {
            bf if bf > 1 => Dir::Left,
            bf if bf < -1 => Dir::Right,
            _ => return node,
        };

        // The heavy child exists and its key differs from `probe`, which was inserted below it.
        let outer = match node.child(heavy) {
            Some(child) => Dir::of(S::compare(probe, &child.key)) == Some(heavy),
            None => unreachable!("heavy side of an unbalanced node is empty"),
        };

        if outer {
            rotate(node, !heavy, log)
        } else {
            rotate_twice(node, !heavy, log)
        }
    }

    /// Removes `key` from the tree, returning the rotations performed to rebalance it.
    ///
    /// If the key is absent the tree is left untouched and [`TreeError::KeyNotFound`] is
    /// returned.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove(&mut self, key: S::Key) -> Result<Rotations<S::Key>, TreeError> {
        let probe = S::normalize(key)?.key;

        let mut log = Vec::new();
        let len_before = self.len;

        let root = self.root.take();
        self.root = self.remove_at(root, &probe, &mut log);

        if self.len == len_before {
            debug!(key = ?probe, "key to remove not found");
            return Err(TreeError::KeyNotFound);
        }

        Ok(log)
    }

    /// Parses `text` with the tree's key shape and removes the result.
    pub fn remove_str(&mut self, text: &str) -> Result<Rotations<S::Key>, TreeError> {
        let key = S::parse(text).inspect_err(|_| debug!(text, "rejected invalid key"))?;
        self.remove(key)
    }

    fn remove_at(
        &mut self,
        link: Link<S::Key>,
        probe: &S::Key,
        log: &mut Rotations<S::Key>,
    ) -> Link<S::Key> {
        let mut node = link?;

        match Dir::of(S::compare(probe, &node.key)) {
            Some(dir) => {
                let child = node.take_child(dir);
                node.set_child(dir, self.remove_at(child, probe, log));
            }

            None => match mem::take(&mut node.children) {
                [Some(left), Some(right)] => {
                    // Two children: the in-order successor is detached from the right subtree and
                    // its contents replace this node's. Height and children are not copied.
                    let (rest, successor) = Self::remove_min(right, log);
                    let Node { key, display, .. } = *successor;
                    node.key = key;
                    node.display = display;

                    node.children = [Some(left), rest];
                    self.len -= 1;
                }

                // At most one child: splice it into this node's place.
                [left, right] => {
                    self.len -= 1;
                    return left.or(right);
                }
            },
        }

        Some(rebalance_removed(node, log))
    }

    // Detaches the minimum node of the subtree rooted at `node`, rebalancing every level on the
    // way back up. Returns the remaining subtree and the detached node.
    fn remove_min(
        mut node: Box<Node<S::Key>>,
        log: &mut Rotations<S::Key>,
    ) -> (Link<S::Key>, Box<Node<S::Key>>) {
        match node.take_child(Dir::Left) {
            None => {
                let rest = node.take_child(Dir::Right);
                (rest, node)
            }

            Some(left) => {
                let (rest, min) = Self::remove_min(left, log);
                node.set_child(Dir::Left, rest);
                (Some(rebalance_removed(node, log)), min)
            }
        }
    }

    /// Removes every element of the tree.
    pub fn clear(&mut self) {
        let mut stack: Vec<Box<Node<S::Key>>> = self.root.take().into_iter().collect();

        while let Some(mut node) = stack.pop() {
            stack.extend(node.take_child(Dir::Left));
            stack.extend(node.take_child(Dir::Right));
        }

        self.len = 0;

        debug_assert!(self.root.is_none());
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let mut count = 0;
        let h = Self::assert_invariants_at(self.root.as_deref(), None, None, &mut count);

        assert_eq!(h, self.height());
        assert_eq!(count, self.len, "tracked length does not match node count");
    }

    // Checks the subtree rooted at `opt_node`, whose keys must lie strictly between `lower` and
    // `upper`, and returns its recomputed height.
    fn assert_invariants_at(
        opt_node: Option<&Node<S::Key>>,
        lower: Option<&S::Key>,
        upper: Option<&S::Key>,
        count: &mut usize,
    ) -> u32 {
        let Some(node) = opt_node else {
            return 0;
        };

        *count += 1;

        if let Some(lower) = lower {
            assert_eq!(S::compare(lower, &node.key), Ordering::Less, "keys out of order");
        }
        if let Some(upper) = upper {
            assert_eq!(S::compare(&node.key, upper), Ordering::Less, "keys out of order");
        }

        let left = Self::assert_invariants_at(node.left(), lower, Some(&node.key), count);
        let right = Self::assert_invariants_at(node.right(), Some(&node.key), upper, count);

        // Ensure the cached height is current.
        assert_eq!(node.height, 1 + left.max(right), "stale height at {:?}", node.key);

        // Ensure the node is balanced.
        assert!(
            left.abs_diff(right) <= 1,
            "unbalanced node {:?}: h(left) = {left}, h(right) = {right}",
            node.key
        );

        node.height
    }
}

impl<S: KeyShape> Default for AvlTree<S> {
    fn default() -> Self {
        AvlTree::new()
    }
}

impl<S: KeyShape> Drop for AvlTree<S> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<S: KeyShape> fmt::Debug for AvlTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlTree")
            .field("len", &self.len)
            .field("root", &self.root)
            .finish()
    }
}

impl<'tree, S: KeyShape> IntoIterator for &'tree AvlTree<S> {
    type Item = &'tree Node<S::Key>;
    type IntoIter = Iter<'tree, S::Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
