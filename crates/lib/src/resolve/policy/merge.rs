//! Field-merge resolution: fold every losing leaf into the winner.
//!
//! Losers are merged in the order the store returns them, so on a field present
//! in several losers the last one merged wins. This is a deterministic but
//! store-order-dependent overwrite, not a content-aware merge.

use tracing::{debug, warn};

use crate::backend::{DocumentStore, OpenRevs};
use crate::constants::{MSG_MERGED, MSG_NO_CONFLICTS, MSG_OPERATION_FAILED};
use crate::document::{ConflictedDocument, Document, is_reserved};
use crate::resolve::commit::commit;
use crate::resolve::errors::ResolveError;
use crate::resolve::filter::live_revisions;
use crate::resolve::outcome::Resolution;
use crate::resolve::scope::DocId;

/// Copies every field of `loser` onto `winner`, overwriting on collision.
///
/// The id and revision of `winner` are never touched.
pub fn merge_fields(winner: &mut Document, loser: &Document) {
    for (name, value) in &loser.fields {
        if is_reserved(name) {
            continue;
        }
        winner.fields.insert(name.clone(), value.clone());
    }
}

pub(crate) async fn resolve(store: &dyn DocumentStore, id: &DocId) -> Resolution {
    let fetch_failed = |e: crate::Error| {
        warn!(id = %id, error = %e, "Could not read document");
        Resolution::failed(
            MSG_OPERATION_FAILED,
            ResolveError::Fetch {
                id: id.to_string(),
                source: Box::new(e),
            },
        )
    };

    let current = match store.get_with_conflicts(id).await {
        Ok(current) => current,
        Err(e) if e.is_not_found() => return Resolution::nothing_to_do(MSG_NO_CONFLICTS),
        Err(e) => return fetch_failed(e),
    };
    if !current.has_conflicts() {
        return Resolution::nothing_to_do(MSG_NO_CONFLICTS);
    }

    let ConflictedDocument {
        conflicts,
        doc: mut winner,
    } = current;
    let reads = match store
        .get_open_revisions(id, OpenRevs::Only(conflicts))
        .await
    {
        Ok(reads) => reads,
        Err(e) => return fetch_failed(e),
    };
    let losers = live_revisions(reads, winner.rev.as_ref());
    if losers.is_empty() {
        return Resolution::nothing_to_do(MSG_NO_CONFLICTS);
    }

    let mut batch = Vec::with_capacity(losers.len() + 1);
    for loser in &losers {
        merge_fields(&mut winner, loser);
        batch.extend(loser.to_tombstone());
    }
    debug!(id = %id, rev = ?winner.rev, merged = losers.len(), "Merged losing leaves");
    batch.push(winner);

    commit(store, batch, MSG_MERGED).await
}
