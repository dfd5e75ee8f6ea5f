//! In-memory store implementation
//!
//! This module provides an in-memory implementation of the `DocumentStore` trait,
//! suitable for testing, development, or embedding where a full document database
//! is not available. It keeps a real revision tree per id, so conflicts, winners
//! and compare-and-swap writes behave the way a CouchDB-style store does.

mod storage;
mod tree;
mod views;

pub use views::{MapFn, conflicts_map};

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::errors::StoreError;
use crate::backend::{
    AllDocsRow, DocumentStore, OpenRevs, RevisionRead, ViewResult, WriteResult,
};
use crate::constants::{CONFLICTS_VIEW, RESOLVER_DESIGN};
use crate::document::{ConflictedDocument, Document, Rev};
use crate::Result;
use tree::RevTree;

/// A revision-tree document store held in memory.
///
/// Documents are kept in id order, which is also the order views emit rows in.
/// Views are evaluated by native map functions registered per design document and
/// view name; the resolver's conflict view is registered by [`InMemory::new`].
/// A view can only be queried once its design document is stored and defines it.
pub struct InMemory {
    /// Revision trees keyed by document id
    pub(crate) docs: RwLock<BTreeMap<String, RevTree>>,
    /// Map functions keyed by (design, view)
    pub(crate) views: RwLock<HashMap<(String, String), MapFn>>,
}

impl std::fmt::Debug for InMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemory").finish_non_exhaustive()
    }
}

impl InMemory {
    /// Creates a new, empty store that can serve the resolver's conflict view.
    pub fn new() -> Self {
        Self::empty().with_view(RESOLVER_DESIGN, CONFLICTS_VIEW, conflicts_map())
    }

    /// Creates a new, empty store with no views registered.
    pub fn empty() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
            views: RwLock::new(HashMap::new()),
        }
    }

    /// Registers the map function serving `_design/<design>/_view/<view>`.
    pub fn with_view(mut self, design: &str, view: &str, map: MapFn) -> Self {
        self.views
            .get_mut()
            .insert((design.to_string(), view.to_string()), map);
        self
    }

    /// Writes a single document with compare-and-swap semantics.
    ///
    /// # Returns
    /// The new revision, or `StoreError::Conflict` when the write names a stale revision.
    pub async fn put(&self, doc: Document) -> Result<Rev> {
        let id = doc.id.clone();
        let mut results = storage::bulk_write(self, vec![doc]).await?;
        match results.pop() {
            Some(WriteResult { rev: Some(rev), .. }) => Ok(rev),
            _ => Err(StoreError::Conflict { id }.into()),
        }
    }

    /// Inserts a revision under `parent` without checking that `parent` is a leaf.
    ///
    /// This is how a replicator lands edits made elsewhere: two grafts under the same
    /// parent leave the document with two conflicting leaves.
    pub async fn graft(&self, doc: Document, parent: Option<&Rev>) -> Result<Rev> {
        storage::graft(self, doc, parent).await
    }

    /// Returns the ids of all stored documents, design documents included.
    pub async fn ids(&self) -> Vec<String> {
        self.docs.read().await.keys().cloned().collect()
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemory {
    async fn get_open_revisions(&self, id: &str, revs: OpenRevs) -> Result<Vec<RevisionRead>> {
        storage::get_open_revisions(self, id, revs).await
    }

    async fn get_with_conflicts(&self, id: &str) -> Result<ConflictedDocument> {
        storage::get_with_conflicts(self, id).await
    }

    async fn all_by_id(&self, keys: &[String]) -> Result<Vec<AllDocsRow>> {
        storage::all_by_id(self, keys).await
    }

    async fn bulk_write(&self, docs: Vec<Document>) -> Result<Vec<WriteResult>> {
        storage::bulk_write(self, docs).await
    }

    async fn query(&self, design: &str, view: &str) -> Result<ViewResult> {
        storage::query(self, design, view).await
    }
}
