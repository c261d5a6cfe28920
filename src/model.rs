extern crate std;

use std::{
    collections::{BTreeMap, BTreeSet},
    prelude::v1::*,
};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, CaseFolded, Natural, TreeError, WordTree};

/// The tree the model harness checks against [`BTreeSet`].
pub type ModelTree = AvlTree<Natural<u32>>;

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Get(ItemValue),
    Remove(ItemValue),
    First,
    Last,
    Clear,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Get(item) => FinalOp::Get(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::First => FinalOp::First,
            Op::Last => FinalOp::Last,
            Op::Clear => FinalOp::Clear,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Get(u32),
    Remove(u32),
    First,
    Last,
    Clear,
}

// `Op::Clear` is left to the fuzzer so that proptest runs grow trees deep enough to need
// rebalancing at many levels.
pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        4 => value_strategy().prop_map(Op::Insert),
        2 => value_strategy().prop_map(Op::Get),
        3 => value_strategy().prop_map(Op::Remove),
        1 => Just(Op::First),
        1 => Just(Op::Last),
    ]
}

pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut avl = ModelTree::new();

    fn insert_sorted(v: &mut Vec<u32>, value: u32) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    fn remove_sorted(v: &mut Vec<u32>, value: u32) {
        if let Ok(idx) = v.binary_search(&value) {
            v.remove(idx);
        }
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);

                let from_btree = btree.insert(value);
                let from_avl = match avl.insert(value) {
                    Ok(_) => true,
                    Err(TreeError::DuplicateKey) => false,
                    Err(e) => panic!("FinalOp #{op_id}: {final_op:?}: unexpected {e:?}"),
                };

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Get(value) => {
                let from_btree = btree.get(&value);
                let from_avl = avl.get(value).map(|node| node.key());

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(value) => {
                remove_sorted(&mut sorted_values, value);

                let from_btree = btree.remove(&value);
                let from_avl = match avl.remove(value) {
                    Ok(_) => true,
                    Err(TreeError::KeyNotFound) => false,
                    Err(e) => panic!("FinalOp #{op_id}: {final_op:?}: unexpected {e:?}"),
                };

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first();
                let from_avl = avl.first().map(|node| node.key());

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last();
                let from_avl = avl.last().map(|node| node.key());

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Clear => {
                sorted_values.clear();
                btree.clear();
                avl.clear();
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(btree.iter().eq(avl.iter().map(|node| node.key())));
    }
}

/// A word list and a prefix query over it.
#[derive(Clone, Debug)]
pub struct SuggestInput {
    pub words: Vec<String>,
    pub prefix: String,
    pub limit: usize,
}

impl<'a> arbitrary::Arbitrary<'a> for SuggestInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        // A small alphabet makes shared prefixes and case collisions likely.
        fn word(u: &mut arbitrary::Unstructured<'_>, max_len: u8) -> String {
            let len = u8::arbitrary(u).unwrap_or(0) % max_len;
            (0..len)
                .map(|_| *u.choose(&['a', 'b', 'c', 'A', 'B', ' ']).unwrap_or(&'a'))
                .collect()
        }

        let num_words = u8::arbitrary(u)? % 100;
        let words = (0..num_words).map(|_| word(u, 6)).collect();
        let prefix = word(u, 3);
        let limit = usize::from(u8::arbitrary(u)? % 16);

        Ok(SuggestInput {
            words,
            prefix,
            limit,
        })
    }
}

pub fn suggest_input_strategy() -> impl Strategy<Value = SuggestInput> {
    let word = "[abcAB ]{0,6}";
    (
        proptest::collection::vec(word, 0..100),
        "[abcAB]{0,3}",
        0usize..16,
    )
        .prop_map(|(words, prefix, limit)| SuggestInput {
            words,
            prefix,
            limit,
        })
}

pub fn run_suggest_equivalence(input: SuggestInput) {
    let SuggestInput {
        words,
        prefix,
        limit,
    } = input;

    // Folded key -> display form of the first spelling inserted.
    let mut model = BTreeMap::new();
    let mut tree = WordTree::new();

    for word in words {
        let trimmed = word.trim();
        let result = tree.insert(word.clone());

        if trimmed.is_empty() {
            assert!(matches!(result, Err(TreeError::InvalidKey { .. })));
            continue;
        }

        let fresh = !model.contains_key(&CaseFolded::fold(trimmed));
        model
            .entry(CaseFolded::fold(trimmed))
            .or_insert_with(|| trimmed.to_string());

        assert_eq!(result.is_ok(), fresh, "word {word:?}");
    }

    tree.assert_invariants();

    let folded = CaseFolded::fold(&prefix);
    let expected: Vec<(&str, &str)> = model
        .iter()
        .filter(|(key, _)| key.starts_with(&folded))
        .take(limit)
        .map(|(key, display)| (key.as_str(), display.as_str()))
        .collect();

    let found = tree.suggest(&prefix, limit);
    let found: Vec<(&str, &str)> = found
        .iter()
        .map(|s| (s.key.as_str(), s.display.as_str()))
        .collect();

    assert_eq!(expected, found, "prefix {prefix:?}, limit {limit}");
}
