use alloc::string::String;
use core::{cmp::Ordering, fmt, marker::PhantomData, str::FromStr};

use crate::TreeError;

/// The comparison, normalization and parsing rules for the keys of an [`AvlTree`].
///
/// [`AvlTree`]: crate::AvlTree
pub trait KeyShape {
    type Key: Clone + fmt::Debug;

    /// Orders two normalized keys.
    fn compare(a: &Self::Key, b: &Self::Key) -> Ordering;

    /// Splits a caller-supplied key into the stored key and its display form.
    fn normalize(raw: Self::Key) -> Result<Normalized<Self::Key>, TreeError>;

    /// Parses a key from text.
    fn parse(text: &str) -> Result<Self::Key, TreeError>;
}

/// A key as stored in the tree, plus the form it was supplied in, if that differs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Normalized<K> {
    pub key: K,
    pub display: Option<K>,
}

/// Totally ordered scalar keys, stored as given.
pub struct Natural<K> {
    _key: PhantomData<fn() -> K>,
}

impl<K> KeyShape for Natural<K>
where
    K: Ord + Clone + fmt::Debug + FromStr,
{
    type Key = K;

    #[inline]
    fn compare(a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }

    #[inline]
    fn normalize(raw: K) -> Result<Normalized<K>, TreeError> {
        Ok(Normalized {
            key: raw,
            display: None,
        })
    }

    fn parse(text: &str) -> Result<K, TreeError> {
        text.trim().parse().map_err(|_| TreeError::invalid(text))
    }
}

/// Case-insensitive words.
///
/// Words are trimmed, then stored lower-cased with the trimmed original kept for display. Blank
/// words are rejected.
pub struct CaseFolded;

impl CaseFolded {
    /// Folds `text` the way stored keys are folded, without trimming.
    pub fn fold(text: &str) -> String {
        text.to_lowercase()
    }
}

impl KeyShape for CaseFolded {
    type Key = String;

    #[inline]
    fn compare(a: &String, b: &String) -> Ordering {
        a.cmp(b)
    }

    fn normalize(raw: String) -> Result<Normalized<String>, TreeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TreeError::invalid(&raw));
        }

        let key = CaseFolded::fold(trimmed);
        let display = if trimmed.len() == raw.len() {
            raw
        } else {
            trimmed.into()
        };

        Ok(Normalized {
            key,
            display: Some(display),
        })
    }

    fn parse(text: &str) -> Result<String, TreeError> {
        Ok(text.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_parse() {
        assert_eq!(Natural::<i64>::parse(" 42 "), Ok(42));
        assert_eq!(
            Natural::<i64>::parse("forty-two"),
            Err(TreeError::InvalidKey {
                input: "forty-two".into()
            })
        );
        assert!(Natural::<u32>::parse("-1").is_err());
    }

    #[test]
    fn case_folded_normalize() {
        let n = CaseFolded::normalize("  Google ".into()).unwrap();
        assert_eq!(n.key, "google");
        assert_eq!(n.display.as_deref(), Some("Google"));

        assert!(matches!(
            CaseFolded::normalize(" \t ".into()),
            Err(TreeError::InvalidKey { .. })
        ));
    }
}
