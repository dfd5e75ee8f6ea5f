//! Idempotent creation of helper documents, such as the conflict view.
//!
//! Several processes may install the same design document at once. The store's
//! revision check arbitrates: the loser's write comes back as a `conflict` row,
//! which means the document is already there.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::errors::ResolveError;
use super::outcome::{BatchOutcome, Resolution};
use crate::backend::DocumentStore;
use crate::config::ResolverConfig;
use crate::constants::{
    CONFLICT, CONFLICTS_MAP_SOURCE, MSG_DOCUMENTS_UNCHANGED, MSG_DOCUMENTS_WRITTEN,
    MSG_OPERATION_FAILED,
};
use crate::document::{Document, Fields, docs_are_equal};

/// The design document holding the view that enumerates conflicted documents.
pub fn resolver_design_document(config: &ResolverConfig) -> Document {
    let mut views = Fields::new();
    views.insert(config.view.clone(), json!({ "map": CONFLICTS_MAP_SOURCE }));
    Document::new(config.design_id()).with_field("views", Value::Object(views))
}

/// Creates the given documents, or updates them where the stored version differs.
///
/// Documents already stored with the same content are left alone; when nothing
/// needs writing no batch is sent. A read error other than "not found" aborts
/// before any write.
pub async fn ensure_documents(store: &dyn DocumentStore, docs: Vec<Document>) -> Resolution {
    let keys: Vec<String> = docs.iter().map(|doc| doc.id.clone()).collect();
    let rows = match store.all_by_id(&keys).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, "Could not read the current documents");
            return Resolution::failed(
                MSG_OPERATION_FAILED,
                ResolveError::Fetch {
                    id: keys.join(","),
                    source: Box::new(e),
                },
            );
        }
    };

    let mut scheduled = Vec::new();
    for mut doc in docs {
        let Some(row) = rows.iter().find(|row| row.key == doc.id) else {
            scheduled.push(doc);
            continue;
        };
        if let Some(error) = row.error.as_ref().filter(|_| !row.is_not_found()) {
            warn!(id = %doc.id, error = %error, "Error reading document");
            return Resolution::failed(
                MSG_OPERATION_FAILED,
                ResolveError::FetchRow {
                    id: doc.id,
                    error: error.clone(),
                },
            );
        }
        if row.doc.as_ref().is_some_and(|current| docs_are_equal(current, &doc)) {
            debug!(id = %doc.id, "Document is up to date");
            continue;
        }
        doc.rev = row
            .value
            .as_ref()
            .filter(|value| !value.deleted)
            .map(|value| value.rev.clone());
        scheduled.push(doc);
    }

    if scheduled.is_empty() {
        return Resolution::nothing_to_do(MSG_DOCUMENTS_UNCHANGED);
    }

    let submitted = scheduled.len();
    let outcome = match store.bulk_write(scheduled).await {
        Ok(rows) => BatchOutcome::new(rows),
        Err(e) => {
            warn!(error = %e, "Could not write documents");
            return Resolution::failed(
                MSG_OPERATION_FAILED,
                ResolveError::Write {
                    source: Box::new(e),
                },
            );
        }
    };

    let rejected = outcome
        .failed()
        .find(|row| row.error.as_deref() != Some(CONFLICT))
        .map(|row| ResolveError::Rejected {
            id: row.id.clone(),
            error: row.error.clone().unwrap_or_default(),
        });
    if let Some(err) = rejected {
        warn!(error = %err, "Store rejected a document");
        return Resolution::failed(MSG_OPERATION_FAILED, err).with_value(outcome);
    }
    for row in outcome.failed() {
        debug!(id = %row.id, "Document was written concurrently by another client");
    }

    info!(submitted, "Wrote documents");
    Resolution::committed(MSG_DOCUMENTS_WRITTEN, outcome)
}
