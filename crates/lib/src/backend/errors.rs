//! Store error types for the Deconflict backend.
//!
//! This module defines structured error types for document store operations,
//! providing better error context and type safety compared to string-based errors.

use thiserror::Error;

/// Errors that can occur during document store operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document not found by id, or its winning revision is deleted.
    #[error("Document not found: {id}")]
    NotFound {
        /// The id of the document that was not found
        id: String,
    },

    /// A write named a revision that is not a current leaf.
    #[error("Document update conflict: {id}")]
    Conflict {
        /// The id of the document whose write was rejected
        id: String,
    },

    /// The view has no definition in its design document.
    #[error("View not found: _design/{design}/_view/{view}")]
    ViewNotFound {
        /// The design document name
        design: String,
        /// The view name
        view: String,
    },

    /// The store cannot evaluate the view's map function.
    #[error("View is not supported by this store: _design/{design}/_view/{view}")]
    UnsupportedView {
        /// The design document name
        design: String,
        /// The view name
        view: String,
    },

    /// The store could not be reached or did not answer.
    #[error("Store unavailable: {reason}")]
    Unavailable {
        /// Description of the transport failure
        reason: String,
    },

    /// The store answered with a non-success status.
    #[error("Store returned HTTP {status}: {reason}")]
    Http {
        /// The HTTP status code
        status: u16,
        /// The error reason reported by the store
        reason: String,
    },

    /// The store answered with a body that could not be interpreted.
    #[error("Invalid store response: {reason}")]
    InvalidResponse {
        /// Description of what could not be interpreted
        reason: String,
    },

    /// The store configuration is unusable.
    #[error("Invalid store configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration problem
        reason: String,
    },

    /// Internal store state could not be accessed.
    #[error("Store state inconsistency: {reason}")]
    StateInconsistency {
        /// Description of the state inconsistency
        reason: String,
    },
}

impl StoreError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. } | StoreError::ViewNotFound { .. }
        ) || matches!(self, StoreError::Http { status: 404, .. })
    }

    /// Check if this error indicates a revision conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
            || matches!(self, StoreError::Http { status: 409, .. })
    }

    /// Check if this error is related to the transport layer.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable { .. }
                | StoreError::Http { .. }
                | StoreError::InvalidResponse { .. }
        )
    }

    /// Check if this error concerns a view.
    pub fn is_view_error(&self) -> bool {
        matches!(
            self,
            StoreError::ViewNotFound { .. } | StoreError::UnsupportedView { .. }
        )
    }

    /// Get the document id if this error is about a specific document.
    pub fn document_id(&self) -> Option<&str> {
        match self {
            StoreError::NotFound { id } | StoreError::Conflict { id } => Some(id),
            _ => None,
        }
    }
}

// Conversion from StoreError to the main Error type
impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
