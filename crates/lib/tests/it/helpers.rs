use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use deconflict::{
    ConflictedDocument, Document, DocumentStore, Result, Rev,
    backend::database::InMemory,
    backend::{AllDocsRow, OpenRevs, RevisionRead, StoreError, ViewResult, ViewRow, WriteResult},
};

// ==========================
// CONFLICT BUILDERS
// ==========================

/// Stores a root revision of `id` and grafts every leaf directly under it.
///
/// Leaves must differ in content; identical content under one parent yields the
/// same revision token and collapses into a single leaf.
pub async fn conflicted(store: &InMemory, id: &str, leaves: Vec<Document>) -> Rev {
    let root = store
        .put(Document::new(id).with_field("root", true))
        .await
        .expect("Failed to store root revision");
    for leaf in leaves {
        store
            .graft(leaf, Some(&root))
            .await
            .expect("Failed to graft leaf");
    }
    root
}

/// A leaf of `id` carrying a single field.
pub fn leaf(id: &str, name: &str, value: impl Into<serde_json::Value>) -> Document {
    Document::new(id).with_field(name, value)
}

/// The live leaves of `id`, winner first for the in-memory store.
pub async fn live_leaves(store: &dyn DocumentStore, id: &str) -> Vec<Document> {
    store
        .get_open_revisions(id, OpenRevs::All)
        .await
        .expect("Failed to read open revisions")
        .into_iter()
        .filter_map(RevisionRead::into_ok)
        .filter(|doc| !doc.deleted)
        .collect()
}

/// Sum of live leaves over the given ids.
pub async fn total_live_leaves(store: &dyn DocumentStore, ids: &[&str]) -> usize {
    let mut total = 0;
    for id in ids {
        total += live_leaves(store, id).await.len();
    }
    total
}

// ==========================
// FAULT INJECTION
// ==========================

/// Store operations a [`FaultyStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    OpenRevisions,
    WithConflicts,
    AllById,
    BulkWrite,
    Query,
}

/// Wraps an [`InMemory`] store, failing selected operations and counting calls.
pub struct FaultyStore {
    inner: InMemory,
    failing: HashSet<Op>,
    hide_existing: bool,
    row_error: Option<String>,
    write_error: Option<String>,
    extra_rows: Vec<ViewRow>,
    calls: Mutex<HashMap<Op, usize>>,
}

impl FaultyStore {
    pub fn new(inner: InMemory) -> Self {
        Self {
            inner,
            failing: HashSet::new(),
            hide_existing: false,
            row_error: None,
            write_error: None,
            extra_rows: Vec::new(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Makes every call of `op` fail with an unavailable-store error.
    pub fn failing(mut self, op: Op) -> Self {
        self.failing.insert(op);
        self
    }

    /// Reports every id as unknown in by-id listings, as a reader racing a writer would.
    pub fn hiding_existing(mut self) -> Self {
        self.hide_existing = true;
        self
    }

    /// Answers every by-id listing with rows carrying `error`.
    pub fn with_row_error(mut self, error: &str) -> Self {
        self.row_error = Some(error.to_string());
        self
    }

    /// Rejects every document of a batch write with `error`, storing nothing.
    pub fn rejecting_writes(mut self, error: &str) -> Self {
        self.write_error = Some(error.to_string());
        self
    }

    /// Appends `rows` to every view query result.
    pub fn with_view_rows(mut self, rows: Vec<ViewRow>) -> Self {
        self.extra_rows = rows;
        self
    }

    pub fn inner(&self) -> &InMemory {
        &self.inner
    }

    /// Number of calls made to `op`, failed calls included.
    pub fn calls(&self, op: Op) -> usize {
        self.calls.lock().unwrap().get(&op).copied().unwrap_or(0)
    }

    fn enter(&self, op: Op) -> Result<()> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
        if self.failing.contains(&op) {
            return Err(StoreError::Unavailable {
                reason: format!("injected failure in {op:?}"),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn get_open_revisions(&self, id: &str, revs: OpenRevs) -> Result<Vec<RevisionRead>> {
        self.enter(Op::OpenRevisions)?;
        self.inner.get_open_revisions(id, revs).await
    }

    async fn get_with_conflicts(&self, id: &str) -> Result<ConflictedDocument> {
        self.enter(Op::WithConflicts)?;
        self.inner.get_with_conflicts(id).await
    }

    async fn all_by_id(&self, keys: &[String]) -> Result<Vec<AllDocsRow>> {
        self.enter(Op::AllById)?;
        if let Some(error) = &self.row_error {
            return Ok(keys
                .iter()
                .map(|key| AllDocsRow {
                    error: Some(error.clone()),
                    ..AllDocsRow::not_found(key.clone())
                })
                .collect());
        }
        if self.hide_existing {
            return Ok(keys.iter().cloned().map(AllDocsRow::not_found).collect());
        }
        self.inner.all_by_id(keys).await
    }

    async fn bulk_write(&self, docs: Vec<Document>) -> Result<Vec<WriteResult>> {
        self.enter(Op::BulkWrite)?;
        if let Some(error) = &self.write_error {
            return Ok(docs
                .into_iter()
                .map(|doc| WriteResult::failed(doc.id, error.clone(), "Rejected by the store."))
                .collect());
        }
        self.inner.bulk_write(docs).await
    }

    async fn query(&self, design: &str, view: &str) -> Result<ViewResult> {
        self.enter(Op::Query)?;
        let mut result = self.inner.query(design, view).await?;
        result.rows.extend(self.extra_rows.iter().cloned());
        Ok(result)
    }
}
