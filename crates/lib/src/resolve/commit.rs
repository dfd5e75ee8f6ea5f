//! Submits a resolution's writes as one batch.

use tracing::{info, warn};

use super::errors::ResolveError;
use super::outcome::{BatchOutcome, Resolution};
use crate::backend::DocumentStore;
use crate::constants::MSG_OPERATION_FAILED;
use crate::document::Document;

/// Writes `batch` with a single bulk-write call.
///
/// Rows the store rejects stay inside the returned outcome and do not fail the
/// resolution. A failure of the call itself becomes a failed resolution.
pub async fn commit(store: &dyn DocumentStore, batch: Vec<Document>, message: &str) -> Resolution {
    let submitted = batch.len();
    match store.bulk_write(batch).await {
        Ok(rows) => {
            let outcome = BatchOutcome::new(rows);
            let rejected = outcome.failed().count();
            if rejected > 0 {
                warn!(submitted, rejected, "Store rejected part of the batch");
            } else {
                info!(submitted, "Committed batch");
            }
            Resolution::committed(message, outcome)
        }
        Err(e) => {
            warn!(submitted, error = %e, "Batch write failed");
            Resolution::failed(
                MSG_OPERATION_FAILED,
                ResolveError::Write {
                    source: Box::new(e),
                },
            )
        }
    }
}
