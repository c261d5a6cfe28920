//! Defines the error type returned by tree operations.
use alloc::string::String;

use displaydoc::Display;

/// A recoverable failure of a single tree operation.
///
/// None of these leave the tree modified.
#[derive(Display, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// key is already present
    DuplicateKey,
    /// key not found
    KeyNotFound,
    /// invalid key: `{input}`
    InvalidKey { input: String },
}

impl TreeError {
    pub(crate) fn invalid(input: &str) -> TreeError {
        TreeError::InvalidKey {
            input: input.into(),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TreeError {}
