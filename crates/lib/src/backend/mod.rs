//! Store implementations for Deconflict
//!
//! This module provides the core `DocumentStore` trait and the store implementations
//! the resolution policies can run against.
//!
//! The `DocumentStore` trait is the minimum surface of a revision-tree document
//! database the policies need. Replication and the revision-tree engine itself live
//! behind it; the policies only read leaves and submit batch writes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::constants::NOT_FOUND;
use crate::document::{ConflictedDocument, Document, Rev};

// Category modules
pub mod database;
pub mod errors;

pub use errors::StoreError;

/// Which revisions an open-revisions read should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenRevs {
    /// Every leaf of the revision tree, tombstoned leaves included.
    All,
    /// Exactly the named revisions.
    Only(Vec<Rev>),
}

/// One entry of an open-revisions read.
///
/// Serialized the way CouchDB answers `?open_revs=`: `{"ok": doc}` or `{"missing": rev}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionRead {
    /// The revision body was found.
    Ok(Document),
    /// The store has no body for the requested revision.
    Missing(Rev),
}

impl RevisionRead {
    /// The document, when the read succeeded.
    pub fn ok(&self) -> Option<&Document> {
        match self {
            RevisionRead::Ok(doc) => Some(doc),
            RevisionRead::Missing(_) => None,
        }
    }

    /// Consumes the read, keeping the document when the read succeeded.
    pub fn into_ok(self) -> Option<Document> {
        match self {
            RevisionRead::Ok(doc) => Some(doc),
            RevisionRead::Missing(_) => None,
        }
    }
}

/// Current revision summary of an id in a by-id listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowValue {
    /// The winning revision.
    pub rev: Rev,
    /// True when the winning revision is a tombstone.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

/// One row of a by-id listing (`_all_docs` with keys and bodies).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllDocsRow {
    /// The requested id.
    pub key: String,
    /// The id found, absent for error rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Winning revision summary, absent for error rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RowValue>,
    /// The winning revision body; absent for errors and deleted documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Document>,
    /// Row-level error, e.g. `not_found`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AllDocsRow {
    /// A row for an id the store does not know.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            id: None,
            value: None,
            doc: None,
            error: Some(NOT_FOUND.to_string()),
        }
    }

    /// Returns true when the row reports the id as unknown.
    pub fn is_not_found(&self) -> bool {
        self.error
            .as_deref()
            .is_some_and(|error| error.eq_ignore_ascii_case(NOT_FOUND))
    }

    /// The current winning revision, if the store reported one.
    pub fn current_rev(&self) -> Option<&Rev> {
        self.value.as_ref().map(|value| &value.rev)
    }
}

/// Per-document outcome of a batch write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResult {
    /// The document id the row refers to.
    pub id: String,
    /// The new revision, when the write was accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<Rev>,
    /// Row-level error, e.g. `conflict`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-readable reason for the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl WriteResult {
    /// An accepted write.
    pub fn written(id: impl Into<String>, rev: Rev) -> Self {
        Self {
            id: id.into(),
            rev: Some(rev),
            error: None,
            reason: None,
        }
    }

    /// A rejected write.
    pub fn failed(id: impl Into<String>, error: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: None,
            error: Some(error.into()),
            reason: Some(reason.into()),
        }
    }

    /// Returns true when the store accepted this write.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// One row of a map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    /// Id of the document that emitted the row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Emitted key.
    #[serde(default)]
    pub key: Value,
    /// Emitted value.
    #[serde(default)]
    pub value: Value,
    /// Row-level error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of querying a map view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewResult {
    /// Rows in key order as produced by the store.
    #[serde(default)]
    pub rows: Vec<ViewRow>,
}

/// Store trait abstracting the revision-tree document database.
///
/// This trait defines the reads and the batch write the resolution policies are
/// built from. Every call is asynchronous; a policy awaits each call before issuing
/// the next one and never runs two calls of one resolution in parallel.
///
/// Implementations must be `Send` and `Sync` so one store handle can serve
/// concurrent resolutions. The store's own compare-and-swap on revision tokens is
/// the only protection against two resolutions racing on the same id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads leaf revisions of a document.
    ///
    /// With [`OpenRevs::All`] every leaf is returned, tombstones included, in the
    /// store's enumeration order. With [`OpenRevs::Only`] one entry is returned per
    /// requested revision, `Missing` where the store has no body for it.
    ///
    /// # Errors
    /// `StoreError::NotFound` when the id has never existed.
    async fn get_open_revisions(&self, id: &str, revs: OpenRevs) -> Result<Vec<RevisionRead>>;

    /// Reads the winning revision of a document together with its live conflicts.
    ///
    /// # Errors
    /// `StoreError::NotFound` when the id does not exist or its winner is a tombstone.
    async fn get_with_conflicts(&self, id: &str) -> Result<ConflictedDocument>;

    /// Reads the winning revisions of several ids, one row per requested key.
    ///
    /// Unknown ids produce rows with `error: "not_found"` rather than a failure.
    async fn all_by_id(&self, keys: &[String]) -> Result<Vec<AllDocsRow>>;

    /// Submits several writes in one call.
    ///
    /// Row-level rejections (such as a stale revision) are reported per row; an `Err`
    /// means the call itself failed.
    async fn bulk_write(&self, docs: Vec<Document>) -> Result<Vec<WriteResult>>;

    /// Queries a map view defined in `_design/<design>`.
    ///
    /// # Errors
    /// `StoreError::ViewNotFound` when the design document or the view is absent.
    async fn query(&self, design: &str, view: &str) -> Result<ViewResult>;
}
