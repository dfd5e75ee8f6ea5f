//! Revision token type.
//!
//! A `Rev` names one version of a document inside the store's revision tree.
//! Stores issue tokens shaped `<generation>-<hash>`; the library treats them as
//! opaque and only reads the generation where a store needs to rank leaves.

use serde::{Deserialize, Serialize};

/// An opaque revision token, e.g. `3-917fa2381192822767f010b95b45325b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rev(String);

impl Rev {
    /// Creates a revision token from any string-like input.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Builds a token from a generation number and a hash.
    pub fn from_parts(generation: u64, hash: &str) -> Self {
        Self(format!("{generation}-{hash}"))
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric generation prefix, if the token carries one.
    pub fn generation(&self) -> Option<u64> {
        self.0.split_once('-')?.0.parse().ok()
    }

    /// The part of the token after the generation prefix.
    pub fn hash(&self) -> &str {
        self.0.split_once('-').map_or(self.0.as_str(), |(_, hash)| hash)
    }
}

impl From<String> for Rev {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Rev {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&Rev> for Rev {
    fn from(rev: &Rev) -> Self {
        rev.clone()
    }
}

impl AsRef<str> for Rev {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Rev {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0)
    }
}

impl PartialEq<str> for Rev {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Rev {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<Rev> for String {
    fn from(rev: Rev) -> Self {
        rev.0
    }
}
