//! Documents as stored in a revision-tree database.
//!
//! A `Document` is one revision of one id: store-owned metadata (`_id`, `_rev`,
//! `_deleted`) plus an ordered mapping of user fields. Several documents may share
//! an id and differ by revision; those are leaves of the same revision tree.
//!
//! The serde representation is the CouchDB wire shape, with metadata members
//! prefixed by `_` and user fields flattened next to them.

mod rev;

pub use rev::Rev;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DELETED_FIELD, ID_FIELD, READ_ONLY_FIELDS, REV_FIELD};

/// Ordered mapping from field name to value.
pub type Fields = serde_json::Map<String, Value>;

/// One revision of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct Document {
    /// The document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// The revision this document was read at, or the revision it updates when written.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<Rev>,
    /// Tombstone flag.
    #[serde(rename = "_deleted", skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
    /// User fields, in store order.
    #[serde(flatten)]
    pub fields: Fields,
}

/// Wire form accepted on reads. Read-only metadata is dropped on conversion.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_rev", default)]
    rev: Option<Rev>,
    #[serde(rename = "_deleted", default)]
    deleted: bool,
    #[serde(flatten)]
    fields: Fields,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        let mut fields = raw.fields;
        for name in READ_ONLY_FIELDS {
            fields.remove(*name);
        }
        Self {
            id: raw.id,
            rev: raw.rev,
            deleted: raw.deleted,
            fields,
        }
    }
}

impl Document {
    /// Creates a live document with no revision and no fields.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: None,
            deleted: false,
            fields: Fields::new(),
        }
    }

    /// Builds a tombstone write: `{_id, _rev, _deleted: true}` without field data.
    pub fn tombstone(id: impl Into<String>, rev: impl Into<Rev>) -> Self {
        Self {
            id: id.into(),
            rev: Some(rev.into()),
            deleted: true,
            fields: Fields::new(),
        }
    }

    /// Sets the revision this document refers to.
    pub fn with_rev(mut self, rev: impl Into<Rev>) -> Self {
        self.rev = Some(rev.into());
        self
    }

    /// Sets a field, builder style.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field. Store-owned member names are ignored.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        if is_reserved(&name) {
            return;
        }
        self.fields.insert(name, value.into());
    }

    /// Reads a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Converts this revision into a tombstone write for the same id and revision.
    ///
    /// Returns `None` when the document carries no revision, since a tombstone must
    /// name the leaf it deletes.
    pub fn to_tombstone(&self) -> Option<Document> {
        self.rev
            .as_ref()
            .map(|rev| Document::tombstone(self.id.clone(), rev.clone()))
    }

    /// Returns true for design documents (`_design/...`).
    pub fn is_design(&self) -> bool {
        self.id.starts_with(crate::constants::DESIGN_PREFIX)
    }
}

/// Returns true for member names owned by the store rather than the document author.
pub fn is_reserved(name: &str) -> bool {
    name == ID_FIELD || name == REV_FIELD || name == DELETED_FIELD
}

/// A winning revision together with the tokens of its live conflicting leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictedDocument {
    /// Revision tokens of the other live leaves, as reported by the store.
    #[serde(rename = "_conflicts", default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<Rev>,
    /// The winning revision.
    #[serde(flatten)]
    pub doc: Document,
}

impl ConflictedDocument {
    /// Returns true when the store reported at least one conflicting leaf.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Structural equality of two documents, ignoring their revisions.
///
/// Field order does not matter; nested values are compared deeply.
pub fn docs_are_equal(a: &Document, b: &Document) -> bool {
    a.id == b.id && a.deleted == b.deleted && a.fields == b.fields
}
