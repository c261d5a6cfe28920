extern crate std;

use std::{ops::Range, prelude::v1::*};

use proptest::prelude::*;
use rstest::rstest;

use crate::model::{self, ModelTree};

use super::*;

fn keys(tree: &ModelTree) -> Vec<u32> {
    tree.iter().map(|node| *node.key()).collect()
}

fn build(values: &[u32]) -> ModelTree {
    let mut tree = ModelTree::new();
    for &value in values {
        tree.insert(value).expect("duplicate in test input");
        tree.assert_invariants();
    }
    tree
}

fn insert_find_all(values: &[u32]) {
    let tree = build(values);

    for &value in values {
        let node = tree.get(value).expect("item not found");
        assert_eq!(*node.key(), value);
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    assert_eq!(keys(&tree), sorted);
}

// Calls `f` with every permutation of `0..n`.
fn for_each_permutation(n: u32, f: impl Fn(&[u32])) {
    fn permute(prefix: &mut Vec<u32>, rest: &mut Vec<u32>, f: &dyn Fn(&[u32])) {
        if rest.is_empty() {
            f(prefix);
            return;
        }

        for i in 0..rest.len() {
            let value = rest.remove(i);
            prefix.push(value);
            permute(prefix, rest, f);
            prefix.pop();
            rest.insert(i, value);
        }
    }

    permute(&mut Vec::new(), &mut (0..n).collect(), &f);
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn small_permutations_find() {
    for n in 2..=6 {
        for_each_permutation(n, insert_find_all);
    }
}

fn insert_remove_all(values: &[u32]) {
    let mut tree = build(values);

    for &value in values {
        tree.remove(value).expect("item not found");
        tree.assert_invariants();
        assert!(!tree.contains(value));
    }
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);

    for &value in values {
        tree.insert(value).unwrap();
        tree.assert_invariants();
    }

    for &value in values.iter().rev() {
        tree.remove(value).expect("item not found");
        tree.assert_invariants();
    }
    assert!(tree.is_empty());
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn small_permutations_remove() {
    for n in 2..=6 {
        for_each_permutation(n, insert_remove_all);
    }
}

#[rstest]
#[case::left(&[10, 20, 30], &[(RotationKind::Left, 10)])]
#[case::right(&[30, 20, 10], &[(RotationKind::Right, 30)])]
#[case::left_right(&[30, 10, 20], &[(RotationKind::Left, 10), (RotationKind::Right, 30)])]
#[case::right_left(&[10, 30, 20], &[(RotationKind::Right, 30), (RotationKind::Left, 10)])]
fn three_inserts_rotate_once(#[case] values: &[u32], #[case] expected: &[(RotationKind, u32)]) {
    let mut tree = ModelTree::new();

    let (last, init) = values.split_last().unwrap();
    for &value in init {
        assert!(tree.insert(value).unwrap().is_empty());
    }

    let rotations = tree.insert(*last).unwrap();
    let got: Vec<_> = rotations.iter().map(|r| (r.kind, r.pivot)).collect();
    assert_eq!(got, expected);
    assert_eq!(rotations.last().unwrap().new_root, 20);

    let root = tree.root().unwrap();
    assert_eq!(*root.key(), 20);
    assert_eq!(tree.height(), 2);
    assert_eq!(root.balance_factor(), 0);
    tree.assert_invariants();
}

#[test]
fn remove_keeps_balance_and_count() {
    let mut tree = build(&[50, 25, 75, 10, 30, 60, 80, 5]);

    tree.remove(5).unwrap();
    tree.assert_invariants();
    tree.remove(10).unwrap();
    tree.assert_invariants();

    assert_eq!(tree.len(), 6);
    assert_eq!(keys(&tree), [25, 30, 50, 60, 75, 80]);
}

#[test]
fn remove_with_two_children_uses_successor() {
    let mut tree = build(&[50, 25, 75, 10, 30, 60, 80]);

    assert!(tree.remove(50).unwrap().is_empty());
    tree.assert_invariants();

    assert_eq!(*tree.root().unwrap().key(), 60);
    assert_eq!(tree.len(), 6);
    assert!(!tree.contains(50));
}

#[test]
fn remove_rebalances_every_level() {
    // A minimal AVL tree of height 5: removing its shallowest leaf shortens one subtree at each
    // level, so rebalancing happens more than once on the way up.
    let mut tree = build(&[8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1]);
    assert_eq!(tree.height(), 5);

    let rotations = tree.remove(12).unwrap();
    tree.assert_invariants();

    let pivots: Vec<_> = rotations.iter().map(|r| r.pivot).collect();
    assert_eq!(pivots, [11, 8]);
    assert_eq!(*tree.root().unwrap().key(), 5);
    assert_eq!(tree.height(), 4);
}

#[test]
fn duplicate_insert_is_noop() {
    let mut tree = build(&[4, 2, 6, 1, 3]);
    let before = tree.snapshot();

    assert_eq!(tree.insert(3), Err(TreeError::DuplicateKey));
    assert_eq!(tree.snapshot(), before);
    assert_eq!(tree.len(), 5);
}

#[test]
fn missing_remove_is_noop() {
    let mut tree = build(&[4, 2, 6]);
    let before = tree.snapshot();

    assert_eq!(tree.remove(5), Err(TreeError::KeyNotFound));
    assert_eq!(tree.snapshot(), before);

    let mut empty = ModelTree::new();
    assert_eq!(empty.remove(5), Err(TreeError::KeyNotFound));
}

#[test]
fn text_keys_are_validated() {
    let mut tree = NumberTree::new();

    assert!(tree.insert_str("-7").is_ok());
    assert!(matches!(tree.insert_str("7.5"), Err(TreeError::InvalidKey { .. })));
    assert!(matches!(tree.remove_str(""), Err(TreeError::InvalidKey { .. })));
    assert_eq!(tree.remove_str(" -7 "), Ok(Vec::new()));
    assert!(tree.is_empty());
}

#[test]
fn words_keep_display_form() {
    let mut tree = WordTree::new();

    tree.insert("Google".into()).unwrap();
    tree.insert("  Golf ".into()).unwrap();
    assert_eq!(tree.insert("GOOGLE".into()), Err(TreeError::DuplicateKey));

    let node = tree.get("gOOgle".into()).unwrap();
    assert_eq!(node.key(), "google");
    assert_eq!(node.display().map(String::as_str), Some("Google"));

    assert_eq!(tree.words().collect::<Vec<_>>(), ["Golf", "Google"]);

    tree.remove("GOOGLE".into()).unwrap();
    assert_eq!(tree.words().collect::<Vec<_>>(), ["Golf"]);
    tree.assert_invariants();
}

#[test]
fn stats_report_min_height() {
    let tree = build(&(0..100).collect::<Vec<_>>());

    let stats = tree.stats();
    assert_eq!(stats.node_count, 100);
    assert_eq!(stats.min_height, 7);
    assert!(stats.height >= stats.min_height);
    assert_eq!(stats.height, tree.height());

    assert_eq!(
        ModelTree::new().stats(),
        Stats {
            node_count: 0,
            height: 0,
            min_height: 0
        }
    );
}

#[test]
fn clear_empties_tree() {
    let mut tree = build(&(0..1000).collect::<Vec<_>>());
    tree.clear();

    assert!(tree.is_empty());
    assert!(tree.root().is_none());
    assert_eq!(tree.iter().count(), 0);

    tree.insert(1).unwrap();
    tree.assert_invariants();
}

#[cfg(feature = "serde")]
#[test]
fn snapshot_serializes() {
    let tree = build(&[2, 1, 3]);
    let json = serde_json::to_value(tree.snapshot()).unwrap();

    assert_eq!(json["key"], 2);
    assert_eq!(json["height"], 2);
    assert_eq!(json["balance"], 0);
    assert_eq!(json["left"]["key"], 1);
    assert_eq!(json["right"]["right"], serde_json::Value::Null);

    let mut tree = ModelTree::new();
    tree.insert(1).unwrap();
    tree.insert(2).unwrap();
    let json = serde_json::to_value(tree.insert(3).unwrap()).unwrap();
    assert_eq!(json[0]["kind"], "left");
    assert_eq!(json[0]["pivot"], 1);
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn suggest_equivalence(input in model::suggest_input_strategy()) {
        model::run_suggest_equivalence(input);
    }

    #[test]
    fn remove_in_any_order_empties(values in proptest::collection::btree_set(0u32..500, 0..200), seed in any::<u64>()) {
        let mut order: Vec<u32> = values.iter().copied().collect();
        let mut tree = build(&order);

        // Deterministic shuffle driven by `seed`.
        let mut state = seed | 1;
        for i in (1..order.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            order.swap(i, (state % (i as u64 + 1)) as usize);
        }

        for value in order {
            tree.remove(value).unwrap();
            tree.assert_invariants();
        }

        prop_assert!(tree.is_empty());
        prop_assert!(tree.root().is_none());
    }
}
