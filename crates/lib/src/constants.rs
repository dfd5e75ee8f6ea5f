//! Constants used throughout the Deconflict library.
//!
//! This module provides central definitions for reserved document members,
//! the helper design document and the messages reported by resolutions.

/// Prefix shared by every design document id.
pub const DESIGN_PREFIX: &str = "_design/";

/// Default name of the helper design document (`_design/resolver`).
pub const RESOLVER_DESIGN: &str = "resolver";

/// Default name of the view enumerating conflicted documents.
pub const CONFLICTS_VIEW: &str = "getConflicts";

/// Source of the map function stored in the helper design document.
pub const CONFLICTS_MAP_SOURCE: &str =
    "function (doc) {\n\tif (doc._conflicts)\n\t\temit(doc._conflicts);\n}";

/// Document members owned by the store. They are never merged between revisions.
pub const ID_FIELD: &str = "_id";
pub const REV_FIELD: &str = "_rev";
pub const DELETED_FIELD: &str = "_deleted";
pub const CONFLICTS_FIELD: &str = "_conflicts";

/// Read-only members a store may attach to a read. They are dropped from fields.
pub const READ_ONLY_FIELDS: &[&str] = &[
    CONFLICTS_FIELD,
    "_revisions",
    "_revs_info",
    "_deleted_conflicts",
    "_local_seq",
];

/// Error string a store reports for a missing document.
pub const NOT_FOUND: &str = "not_found";

/// Error string a store reports for a stale revision on write.
pub const CONFLICT: &str = "conflict";

/// Success message when nothing in scope is conflicted.
pub const MSG_NO_CONFLICTS: &str = "No conflicts to resolve.";
/// Success message for an empty id list.
pub const MSG_EMPTY_SCOPE: &str = "No documents in scope.";
/// Success message after a blind or latest-wins batch.
pub const MSG_RESOLVED: &str = "Conflicts resolved.";
/// Success message after a merge batch.
pub const MSG_MERGED: &str = "Conflicting revisions merged into the winning revision.";
/// Installer message when every document is already current.
pub const MSG_DOCUMENTS_UNCHANGED: &str = "Documents are already up to date.";
/// Installer message after writing missing or changed documents.
pub const MSG_DOCUMENTS_WRITTEN: &str = "The function successfully created the documents.";
/// Failure message for fetch, query and write errors.
pub const MSG_OPERATION_FAILED: &str = "The current operation failed.";
/// Failure message when the helper design document cannot be installed.
pub const MSG_VIEW_INSTALL_FAILED: &str = "Could not install the conflict view.";
