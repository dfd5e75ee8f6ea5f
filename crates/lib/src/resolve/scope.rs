//! Target selection for resolutions.

use serde_json::Value;

use super::errors::ResolveError;
use crate::Result;

/// A validated, non-empty document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocId(String);

impl DocId {
    /// Validates an id.
    ///
    /// # Errors
    /// `ResolveError::InvalidId` when the id is empty.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(ResolveError::InvalidId {
                reason: "document ids cannot be empty".to_string(),
            }
            .into());
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for DocId {
    type Error = crate::Error;

    fn try_from(id: &str) -> Result<Self> {
        Self::new(id)
    }
}

impl TryFrom<String> for DocId {
    type Error = crate::Error;

    fn try_from(id: String) -> Result<Self> {
        Self::new(id)
    }
}

impl AsRef<str> for DocId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for DocId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0)
    }
}

/// Which documents a blind resolution covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Scope {
    /// Every conflicted document in the database.
    #[default]
    All,
    /// One document.
    One(DocId),
    /// An explicit list of documents.
    Many(Vec<DocId>),
}

impl Scope {
    /// Scope covering a single id.
    pub fn one(id: impl Into<String>) -> Result<Self> {
        DocId::new(id).map(Scope::One)
    }

    /// Scope covering a list of ids. Every id must be non-empty.
    pub fn many<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter()
            .map(DocId::new)
            .collect::<Result<Vec<_>>>()
            .map(Scope::Many)
    }

    /// The explicit ids of this scope, without duplicates and in first-seen order.
    ///
    /// Returns `None` for [`Scope::All`].
    pub fn ids(&self) -> Option<Vec<DocId>> {
        match self {
            Scope::All => None,
            Scope::One(id) => Some(vec![id.clone()]),
            Scope::Many(ids) => {
                let mut unique: Vec<DocId> = Vec::with_capacity(ids.len());
                for id in ids {
                    if !unique.contains(id) {
                        unique.push(id.clone());
                    }
                }
                Some(unique)
            }
        }
    }
}

impl From<DocId> for Scope {
    fn from(id: DocId) -> Self {
        Scope::One(id)
    }
}

impl From<Vec<DocId>> for Scope {
    fn from(ids: Vec<DocId>) -> Self {
        Scope::Many(ids)
    }
}

/// Parses a loosely typed scope argument.
///
/// `null` and booleans select the whole database, a string selects one id and an
/// array of strings selects those ids. Anything else is rejected.
impl TryFrom<Value> for Scope {
    type Error = crate::Error;

    fn try_from(value: Value) -> Result<Self> {
        let invalid = |value: &Value| -> crate::Error {
            ResolveError::InvalidScope {
                found: value.to_string(),
            }
            .into()
        };
        match value {
            Value::Null | Value::Bool(_) => Ok(Scope::All),
            Value::String(id) => Scope::one(id),
            Value::Array(items) => {
                let ids = items
                    .iter()
                    .map(|item| match item {
                        Value::String(id) => DocId::new(id.clone()),
                        other => Err(invalid(other)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Scope::Many(ids))
            }
            other => Err(invalid(&other)),
        }
    }
}
