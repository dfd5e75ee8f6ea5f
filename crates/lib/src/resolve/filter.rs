//! Reduces an open-revisions read to the live leaves that take part in a resolution.

use crate::backend::RevisionRead;
use crate::document::{Document, Rev};

/// Keeps the live documents of an open-revisions read.
///
/// Drops `missing` entries, tombstoned leaves and, when given, the leaf whose
/// revision equals `excluded`. The remaining documents keep the store's order.
pub fn live_revisions(reads: Vec<RevisionRead>, excluded: Option<&Rev>) -> Vec<Document> {
    reads
        .into_iter()
        .filter_map(RevisionRead::into_ok)
        .filter(|doc| !doc.deleted)
        .filter(|doc| excluded.is_none() || doc.rev.as_ref() != excluded)
        .collect()
}
