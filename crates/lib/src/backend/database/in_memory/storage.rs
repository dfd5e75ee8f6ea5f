//! Core storage operations for the InMemory store

use serde_json::Value;
use tracing::{debug, trace};

use super::InMemory;
use crate::{
    Result,
    backend::{
        AllDocsRow, OpenRevs, RevisionRead, RowValue, ViewResult, ViewRow, WriteResult,
        errors::StoreError,
    },
    constants::{CONFLICT, DESIGN_PREFIX},
    document::{ConflictedDocument, Document, Rev},
};

pub(crate) async fn get_open_revisions(
    store: &InMemory,
    id: &str,
    revs: OpenRevs,
) -> Result<Vec<RevisionRead>> {
    let docs = store.docs.read().await;
    let tree = docs
        .get(id)
        .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

    let reads = match revs {
        OpenRevs::All => tree
            .leaves()
            .into_iter()
            .map(|doc| RevisionRead::Ok(doc.clone()))
            .collect(),
        OpenRevs::Only(revs) => revs
            .into_iter()
            .map(|rev| match tree.get(&rev) {
                Some(doc) => RevisionRead::Ok(doc.clone()),
                None => RevisionRead::Missing(rev),
            })
            .collect(),
    };
    Ok(reads)
}

pub(crate) async fn get_with_conflicts(store: &InMemory, id: &str) -> Result<ConflictedDocument> {
    let docs = store.docs.read().await;
    docs.get(id)
        .and_then(|tree| {
            tree.live_winner().map(|winner| ConflictedDocument {
                conflicts: tree.conflicts(),
                doc: winner.clone(),
            })
        })
        .ok_or_else(|| StoreError::NotFound { id: id.to_string() }.into())
}

pub(crate) async fn all_by_id(store: &InMemory, keys: &[String]) -> Result<Vec<AllDocsRow>> {
    let docs = store.docs.read().await;
    let rows = keys
        .iter()
        .map(|key| match docs.get(key).and_then(|tree| tree.winner()) {
            Some(winner) => AllDocsRow {
                key: key.clone(),
                id: Some(key.clone()),
                value: winner.rev.clone().map(|rev| RowValue {
                    rev,
                    deleted: winner.deleted,
                }),
                doc: (!winner.deleted).then(|| winner.clone()),
                error: None,
            },
            None => AllDocsRow::not_found(key.clone()),
        })
        .collect();
    Ok(rows)
}

pub(crate) async fn bulk_write(store: &InMemory, batch: Vec<Document>) -> Result<Vec<WriteResult>> {
    let mut docs = store.docs.write().await;
    let mut results = Vec::with_capacity(batch.len());
    for doc in batch {
        let id = doc.id.clone();
        let mut tree = docs.get(&id).cloned().unwrap_or_default();
        match tree.apply(doc) {
            Ok(rev) => {
                trace!(id = %id, rev = %rev, "Stored revision");
                docs.insert(id.clone(), tree);
                results.push(WriteResult::written(id, rev));
            }
            Err(e) if e.is_conflict() => {
                debug!(id = %id, "Rejected write naming a stale revision");
                results.push(WriteResult::failed(id, CONFLICT, "Document update conflict."));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(results)
}

pub(crate) async fn graft(store: &InMemory, doc: Document, parent: Option<&Rev>) -> Result<Rev> {
    let mut docs = store.docs.write().await;
    let id = doc.id.clone();
    let mut tree = docs.get(&id).cloned().unwrap_or_default();
    let rev = tree.insert(parent.cloned(), doc)?;
    docs.insert(id, tree);
    Ok(rev)
}

pub(crate) async fn query(store: &InMemory, design: &str, view: &str) -> Result<ViewResult> {
    let view_not_found = || StoreError::ViewNotFound {
        design: design.to_string(),
        view: view.to_string(),
    };

    let docs = store.docs.read().await;
    let design_doc = docs
        .get(&format!("{DESIGN_PREFIX}{design}"))
        .and_then(|tree| tree.live_winner())
        .ok_or_else(view_not_found)?;
    let defined = design_doc
        .get("views")
        .and_then(|views| views.get(view))
        .and_then(|definition| definition.get("map"))
        .is_some_and(Value::is_string);
    if !defined {
        return Err(view_not_found().into());
    }

    let map = store
        .views
        .read()
        .await
        .get(&(design.to_string(), view.to_string()))
        .cloned()
        .ok_or_else(|| StoreError::UnsupportedView {
            design: design.to_string(),
            view: view.to_string(),
        })?;

    let mut rows = Vec::new();
    for (id, tree) in docs.iter() {
        if id.starts_with(DESIGN_PREFIX) {
            continue;
        }
        let Some(winner) = tree.live_winner() else {
            continue;
        };
        let input = ConflictedDocument {
            conflicts: tree.conflicts(),
            doc: winner.clone(),
        };
        rows.extend(map(&input).into_iter().map(|(key, value)| ViewRow {
            id: Some(id.clone()),
            key,
            value,
            error: None,
        }));
    }
    debug!(design, view, rows = rows.len(), "Evaluated view");
    Ok(ViewResult { rows })
}
