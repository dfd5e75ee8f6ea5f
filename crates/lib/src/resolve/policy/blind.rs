//! Blind resolution: keep one leaf per document and tombstone the others.
//!
//! Database-wide, the surviving leaf is the store's current winner: the conflict
//! view lists exactly the non-winning live leaves. For explicit ids, the survivor
//! is the first live leaf in the store's open-revisions enumeration order.

use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{DocumentStore, OpenRevs};
use crate::config::ResolverConfig;
use crate::constants::{
    MSG_EMPTY_SCOPE, MSG_NO_CONFLICTS, MSG_OPERATION_FAILED, MSG_RESOLVED,
    MSG_VIEW_INSTALL_FAILED,
};
use crate::document::Document;
use crate::resolve::commit::commit;
use crate::resolve::errors::ResolveError;
use crate::resolve::filter::live_revisions;
use crate::resolve::installer::{ensure_documents, resolver_design_document};
use crate::resolve::outcome::Resolution;
use crate::resolve::scope::DocId;

/// Resolves every conflicted document in the database.
pub(crate) async fn resolve_all(store: &dyn DocumentStore, config: &ResolverConfig) -> Resolution {
    let design_doc = resolver_design_document(config);
    let design_id = design_doc.id.clone();
    let install = ensure_documents(store, vec![design_doc]).await;
    if !install.success {
        let reason = install
            .error
            .map_or(install.message, |e| e.to_string());
        warn!(design_id = %design_id, reason = %reason, "Conflict view installation failed");
        return Resolution::failed(
            MSG_VIEW_INSTALL_FAILED,
            ResolveError::ViewInstall { design_id, reason },
        );
    }

    let view = match store.query(&config.design, &config.view).await {
        Ok(view) => view,
        Err(e) => {
            warn!(error = %e, "Conflict view query failed");
            return Resolution::failed(
                MSG_OPERATION_FAILED,
                ResolveError::Query {
                    design: config.design.clone(),
                    view: config.view.clone(),
                    source: Box::new(e),
                },
            );
        }
    };

    let mut tombstones = Vec::new();
    for row in view.rows {
        if let Some(error) = &row.error {
            warn!(key = %row.key, error = %error, "Skipping view row with an error");
            continue;
        }
        let (Some(id), Value::Array(revs)) = (row.id, row.key) else {
            continue;
        };
        tombstones.extend(
            revs.into_iter()
                .filter_map(|rev| match rev {
                    Value::String(rev) => Some(Document::tombstone(id.clone(), rev)),
                    _ => None,
                }),
        );
    }

    if tombstones.is_empty() {
        debug!("No conflicted documents");
        return Resolution::nothing_to_do(MSG_NO_CONFLICTS);
    }
    commit(store, tombstones, MSG_RESOLVED).await
}

/// Resolves the named documents, keeping the first live leaf of each.
pub(crate) async fn resolve_ids(store: &dyn DocumentStore, ids: &[DocId]) -> Resolution {
    if ids.is_empty() {
        return Resolution::nothing_to_do(MSG_EMPTY_SCOPE);
    }

    let mut tombstones = Vec::new();
    for id in ids {
        let reads = match store.get_open_revisions(id, OpenRevs::All).await {
            Ok(reads) => reads,
            Err(e) if e.is_not_found() => {
                debug!(id = %id, "Document not found, nothing to resolve");
                continue;
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Could not read revisions");
                return Resolution::failed(
                    MSG_OPERATION_FAILED,
                    ResolveError::Fetch {
                        id: id.to_string(),
                        source: Box::new(e),
                    },
                );
            }
        };
        let live = live_revisions(reads, None);
        debug!(id = %id, live = live.len(), "Read live leaves");
        tombstones.extend(live.iter().skip(1).filter_map(Document::to_tombstone));
    }

    if tombstones.is_empty() {
        return Resolution::nothing_to_do(MSG_NO_CONFLICTS);
    }
    commit(store, tombstones, MSG_RESOLVED).await
}
