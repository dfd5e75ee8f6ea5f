//! Latest-wins resolution: the leaf with the largest timestamp survives.

use std::cmp::Ordering;

use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{DocumentStore, OpenRevs};
use crate::constants::{MSG_NO_CONFLICTS, MSG_OPERATION_FAILED, MSG_RESOLVED};
use crate::document::Document;
use crate::resolve::commit::commit;
use crate::resolve::errors::ResolveError;
use crate::resolve::filter::live_revisions;
use crate::resolve::outcome::Resolution;
use crate::resolve::scope::DocId;

/// Reads `field` as a timestamp.
///
/// Numbers are taken as-is and numeric strings are parsed. Anything else, dates
/// included, has no timestamp and sorts lowest.
pub fn timestamp(doc: &Document, field: &str) -> Option<f64> {
    let value = match doc.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| !v.is_nan())
}

/// Ascending timestamp order; documents without a timestamp sort first.
pub fn compare_timestamps(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

pub(crate) async fn resolve(store: &dyn DocumentStore, id: &DocId, field: &str) -> Resolution {
    let reads = match store.get_open_revisions(id, OpenRevs::All).await {
        Ok(reads) => reads,
        Err(e) if e.is_not_found() => return Resolution::nothing_to_do(MSG_NO_CONFLICTS),
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

    let mut live = live_revisions(reads, None);
    if live.len() <= 1 {
        return Resolution::nothing_to_do(MSG_NO_CONFLICTS);
    }

    // Stable: among equal timestamps the last enumerated leaf survives.
    live.sort_by(|a, b| compare_timestamps(timestamp(a, field), timestamp(b, field)));
    if let Some(winner) = live.pop() {
        debug!(id = %id, rev = ?winner.rev, losers = live.len(), "Latest leaf selected");
    }

    let tombstones = live.iter().filter_map(Document::to_tombstone).collect();
    commit(store, tombstones, MSG_RESOLVED).await
}
