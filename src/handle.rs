//! A shared, lock-serialized tree for callers behind a service boundary.
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::{
    AvlTree, CaseFolded, KeyShape, NodeSnapshot, Rotations, Stats, Suggestion, TreeError,
};

/// Runtime settings for a [`TreeHandle`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HandleConfig {
    /// Number of suggestions returned when a query does not set its own limit.
    pub suggestion_limit: usize,
}

impl Default for HandleConfig {
    fn default() -> Self {
        HandleConfig {
            suggestion_limit: 10,
        }
    }
}

/// What a mutating call did to the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Outcome {
    Inserted,
    Removed,
    /// The key was already present; the tree is unchanged.
    DuplicateKey,
    /// The key was absent; the tree is unchanged.
    KeyNotFound,
}

/// The tree after a mutating call, and how it got there.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Change<K> {
    pub root: Option<NodeSnapshot<K>>,
    pub rotations: Rotations<K>,
    pub outcome: Outcome,
}

/// An owned [`AvlTree`] behind a single lock.
///
/// Every call holds the lock for its whole duration, so concurrent callers are applied one at a
/// time and each sees a fully rebalanced tree.
pub struct TreeHandle<S: KeyShape> {
    tree: Mutex<AvlTree<S>>,
    config: HandleConfig,
}

impl<S: KeyShape> TreeHandle<S> {
    pub fn new(tree: AvlTree<S>, config: HandleConfig) -> TreeHandle<S> {
        TreeHandle {
            tree: Mutex::new(tree),
            config,
        }
    }

    pub fn config(&self) -> &HandleConfig {
        &self.config
    }

    // Rotations never fail part-way, so a tree behind a poisoned lock is still valid.
    fn lock(&self) -> MutexGuard<'_, AvlTree<S>> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parses `text` and inserts it.
    ///
    /// Only [`TreeError::InvalidKey`] is returned as an error; a duplicate key is reported through
    /// [`Change::outcome`] alongside the unchanged tree.
    pub fn insert(&self, text: &str) -> Result<Change<S::Key>, TreeError> {
        let mut tree = self.lock();

        let (rotations, outcome) = match tree.insert_str(text) {
            Ok(rotations) => (rotations, Outcome::Inserted),
            Err(TreeError::DuplicateKey) => (Rotations::new(), Outcome::DuplicateKey),
            Err(e) => return Err(e),
        };

        debug!(?outcome, rotations = rotations.len(), "insert");

        Ok(Change {
            root: tree.snapshot(),
            rotations,
            outcome,
        })
    }

    /// Parses `text` and removes it.
    ///
    /// Only [`TreeError::InvalidKey`] is returned as an error; an absent key is reported through
    /// [`Change::outcome`] alongside the unchanged tree.
    pub fn remove(&self, text: &str) -> Result<Change<S::Key>, TreeError> {
        let mut tree = self.lock();

        let (rotations, outcome) = match tree.remove_str(text) {
            Ok(rotations) => (rotations, Outcome::Removed),
            Err(TreeError::KeyNotFound) => (Rotations::new(), Outcome::KeyNotFound),
            Err(e) => return Err(e),
        };

        debug!(?outcome, rotations = rotations.len(), "remove");

        Ok(Change {
            root: tree.snapshot(),
            rotations,
            outcome,
        })
    }

    /// Returns a copy of the current tree.
    pub fn tree(&self) -> Option<NodeSnapshot<S::Key>> {
        self.lock().snapshot()
    }

    pub fn stats(&self) -> Stats {
        self.lock().stats()
    }

    /// Consumes the handle, returning the tree.
    pub fn into_inner(self) -> AvlTree<S> {
        self.tree
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl TreeHandle<CaseFolded> {
    /// Returns words starting with `prefix`, at most `limit` of them or the configured default.
    pub fn query(&self, prefix: &str, limit: Option<usize>) -> Vec<Suggestion> {
        let limit = limit.unwrap_or(self.config.suggestion_limit);
        self.lock().suggest(prefix, limit)
    }
}

impl<S: KeyShape> Default for TreeHandle<S> {
    fn default() -> Self {
        TreeHandle::new(AvlTree::new(), HandleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;
    use crate::{NumberTree, RotationKind};

    #[test]
    fn insert_reports_rotations_and_snapshot() {
        let handle = TreeHandle::new(NumberTree::new(), HandleConfig::default());

        handle.insert("10").unwrap();
        handle.insert("20").unwrap();
        let change = handle.insert("30").unwrap();

        assert_eq!(change.outcome, Outcome::Inserted);
        assert_eq!(change.rotations.len(), 1);
        assert_eq!(change.rotations[0].kind, RotationKind::Left);
        assert_eq!(change.rotations[0].pivot, 10);

        let root = change.root.unwrap();
        assert_eq!(root.key, 20);
        assert_eq!(root.height, 2);
        assert_eq!(root.balance, 0);
    }

    #[test]
    fn rejected_calls_keep_tree() {
        let handle: TreeHandle<crate::Natural<i64>> = TreeHandle::default();
        handle.insert("5").unwrap();
        let before = handle.tree();

        let dup = handle.insert(" 5").unwrap();
        assert_eq!(dup.outcome, Outcome::DuplicateKey);
        assert!(dup.rotations.is_empty());
        assert_eq!(dup.root, before);

        let missing = handle.remove("6").unwrap();
        assert_eq!(missing.outcome, Outcome::KeyNotFound);
        assert_eq!(missing.root, before);

        assert_eq!(
            handle.insert("five"),
            Err(TreeError::InvalidKey {
                input: "five".into()
            })
        );
        assert_eq!(handle.stats().node_count, 1);
    }

    #[test]
    fn query_uses_configured_limit() {
        let handle = TreeHandle::new(
            crate::WordTree::new(),
            HandleConfig {
                suggestion_limit: 2,
            },
        );

        for word in ["Golf", "Google", "Gorilla", "Apple"] {
            handle.insert(word).unwrap();
        }

        assert_eq!(handle.query("go", None).len(), 2);
        assert_eq!(handle.query("go", Some(10)).len(), 3);
        assert!(matches!(handle.insert("   "), Err(TreeError::InvalidKey { .. })));
    }

    #[test]
    fn concurrent_inserts_are_serialized() {
        let handle = Arc::new(TreeHandle::<crate::Natural<i64>>::default());

        let workers: Vec<_> = (0..4)
            .map(|t| {
                let handle = Arc::clone(&handle);
                thread::spawn(move || {
                    for i in 0..100 {
                        handle.insert(&(t * 100 + i).to_string()).unwrap();
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        let tree = Arc::try_unwrap(handle).ok().unwrap().into_inner();
        tree.assert_invariants();
        assert_eq!(tree.len(), 400);
        assert!(tree.height() <= 12);
    }
}
