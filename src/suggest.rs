use alloc::{string::String, vec::Vec};

use crate::{CaseFolded, Node, WordTree};

/// A word matching a prefix query.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Suggestion {
    /// The case-folded key.
    pub key: String,
    /// The word as it was inserted.
    pub display: String,
}

impl Suggestion {
    fn of(node: &Node<String>) -> Suggestion {
        Suggestion {
            key: node.key().clone(),
            display: node.display().unwrap_or(node.key()).clone(),
        }
    }
}

impl WordTree {
    /// Returns up to `limit` words starting with `prefix`, ignoring case, in key order.
    ///
    /// Only subtrees that can hold a match are visited, and the search stops as soon as `limit`
    /// matches have been found. An empty prefix matches every word.
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<Suggestion> {
        let prefix = CaseFolded::fold(prefix);
        let mut found = Vec::new();

        if limit > 0 {
            collect_prefixed(self.root(), &prefix, limit, &mut found);
        }

        found.sort_by(|a, b| a.key.cmp(&b.key));
        found
    }

    /// Returns the display form of every word, in key order.
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter()
            .map(|node| node.display().unwrap_or(node.key()).as_str())
    }
}

// Every key starting with `prefix` sorts at or after `prefix`. A key that sorts after `prefix`
// without starting with it sorts after every match, so nothing to its right can match.
fn collect_prefixed(
    opt_node: Option<&Node<String>>,
    prefix: &str,
    limit: usize,
    found: &mut Vec<Suggestion>,
) {
    let Some(node) = opt_node else {
        return;
    };

    let key = node.key().as_str();
    let matches = key.starts_with(prefix);

    if prefix <= key {
        collect_prefixed(node.left(), prefix, limit, found);
    }

    if found.len() >= limit {
        return;
    }

    if matches {
        found.push(Suggestion::of(node));
    }

    if found.len() < limit && (prefix >= key || matches) {
        collect_prefixed(node.right(), prefix, limit, found);
    }
}
