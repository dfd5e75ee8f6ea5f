//!
//! Deconflict: conflict resolution policies for revision-tree document stores.
//!
//! Replicated CouchDB-style databases keep every concurrent edit of a document as a
//! separate leaf revision instead of discarding data. This library collapses those
//! conflicting leaves back to a single live revision per document.
//!
//! ## Core Concepts
//!
//! * **Documents (`document::Document`)**: An id, a revision token, a tombstone flag and an
//!   ordered mapping of fields.
//! * **Stores (`backend::DocumentStore`)**: The revision-tree store the policies run against.
//!   An in-memory store and an HTTP adapter for CouchDB-compatible servers are provided.
//! * **Policies (`resolve`)**: Three ways of choosing the surviving revision:
//!     * **Blind**: keep the store's winning revision, tombstone the rest.
//!     * **Latest wins**: keep the leaf with the largest timestamp field.
//!     * **Merge**: fold the losing leaves' fields into the winner, then tombstone them.
//! * **Resolutions (`resolve::Resolution`)**: Every policy reports through the same
//!   `{success, message, value}` shape; expected "nothing to do" outcomes are successes.

pub mod backend;
pub mod config;
pub mod constants;
pub mod document;
pub mod resolve;

pub use backend::DocumentStore;
pub use config::ResolverConfig;
pub use document::{ConflictedDocument, Document, Rev, docs_are_equal};
pub use resolve::{
    BatchOutcome, DocId, Resolution, Resolver, Scope, blind, ensure_documents, latest_wins,
    merge,
};

/// Result type used throughout the Deconflict library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Deconflict library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured store errors from the backend module
    #[error(transparent)]
    Store(backend::StoreError),

    /// Structured resolution errors from the resolve module
    #[error(transparent)]
    Resolve(resolve::ResolveError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Store(_) => "backend",
            Error::Resolve(_) => "resolve",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            Error::Resolve(resolve_err) => resolve_err
                .store_error()
                .is_some_and(|store_err| store_err.is_not_found()),
            _ => false,
        }
    }

    /// Check if this error indicates a revision conflict on write.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_conflict(),
            Error::Resolve(resolve_err) => resolve_err
                .store_error()
                .is_some_and(|store_err| store_err.is_conflict()),
            _ => false,
        }
    }

    /// Check if this error is a malformed scope or document id.
    pub fn is_scope_error(&self) -> bool {
        match self {
            Error::Resolve(resolve_err) => resolve_err.is_scope_error(),
            _ => false,
        }
    }

    /// Check if this error happened while reading from the store.
    pub fn is_fetch_error(&self) -> bool {
        match self {
            Error::Resolve(resolve_err) => resolve_err.is_fetch_error(),
            _ => false,
        }
    }

    /// Check if this error happened while installing the helper view.
    pub fn is_view_install_error(&self) -> bool {
        match self {
            Error::Resolve(resolve_err) => resolve_err.is_view_install_error(),
            _ => false,
        }
    }

    /// Check if this error happened while submitting a batch write.
    pub fn is_write_error(&self) -> bool {
        match self {
            Error::Resolve(resolve_err) => resolve_err.is_write_error(),
            _ => false,
        }
    }

    /// Check if this error is store/backend-related.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }
}
