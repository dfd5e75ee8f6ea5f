//! Resolution error types for the Deconflict library.
//!
//! Only scope errors are returned to callers directly; every other variant is
//! carried inside a failed [`Resolution`](super::Resolution).

use thiserror::Error;

use crate::backend::StoreError;

/// Errors that can occur while resolving conflicts.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A document id was empty.
    #[error("Invalid document id: {reason}")]
    InvalidId {
        /// Why the id was rejected
        reason: String,
    },

    /// A scope value had the wrong shape.
    #[error("Invalid scope: expected null, a document id or a list of ids, got {found}")]
    InvalidScope {
        /// The rejected value, rendered as JSON
        found: String,
    },

    /// Reading a document from the store failed.
    #[error("Failed to read document {id}")]
    Fetch {
        /// The id being read
        id: String,
        /// The underlying store error
        #[source]
        source: Box<crate::Error>,
    },

    /// The store reported a row-level error other than "not found" while reading.
    #[error("Failed to read document {id}: {error}")]
    FetchRow {
        /// The id of the failed row
        id: String,
        /// The row error reported by the store
        error: String,
    },

    /// Querying the conflict view failed.
    #[error("Failed to query _design/{design}/_view/{view}")]
    Query {
        /// The design document name
        design: String,
        /// The view name
        view: String,
        /// The underlying store error
        #[source]
        source: Box<crate::Error>,
    },

    /// The helper design document could not be created or updated.
    #[error("Failed to install {design_id}: {reason}")]
    ViewInstall {
        /// The id of the design document
        design_id: String,
        /// Why installation failed
        reason: String,
    },

    /// The batch write call itself failed.
    #[error("Batch write failed")]
    Write {
        /// The underlying store error
        #[source]
        source: Box<crate::Error>,
    },

    /// The store rejected a document of a batch the operation cannot proceed without.
    #[error("Write of {id} rejected: {error}")]
    Rejected {
        /// The id of the rejected document
        id: String,
        /// The row error reported by the store
        error: String,
    },
}

impl ResolveError {
    /// Check if this error is a malformed scope or document id.
    pub fn is_scope_error(&self) -> bool {
        matches!(
            self,
            ResolveError::InvalidId { .. } | ResolveError::InvalidScope { .. }
        )
    }

    /// Check if this error happened while reading from the store.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            ResolveError::Fetch { .. } | ResolveError::FetchRow { .. } | ResolveError::Query { .. }
        )
    }

    /// Check if this error happened while installing the helper view.
    pub fn is_view_install_error(&self) -> bool {
        matches!(self, ResolveError::ViewInstall { .. })
    }

    /// Check if this error happened while writing.
    pub fn is_write_error(&self) -> bool {
        matches!(
            self,
            ResolveError::Write { .. } | ResolveError::Rejected { .. }
        )
    }

    /// The store error underneath this error, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            ResolveError::Fetch { source, .. }
            | ResolveError::Query { source, .. }
            | ResolveError::Write { source } => match source.as_ref() {
                crate::Error::Store(store_err) => Some(store_err),
                _ => None,
            },
            _ => None,
        }
    }
}

// Conversion from ResolveError to the main Error type
impl From<ResolveError> for crate::Error {
    fn from(err: ResolveError) -> Self {
        crate::Error::Resolve(err)
    }
}
