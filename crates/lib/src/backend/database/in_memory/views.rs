//! Native map functions for the in-memory store.
//!
//! The in-memory store cannot evaluate the JavaScript source kept in design
//! documents, so each view it serves is backed by a Rust closure registered under
//! the same design and view names.

use std::sync::Arc;

use serde_json::Value;

use crate::document::ConflictedDocument;

/// A map function: receives each live winning revision with its conflicts and
/// returns the `(key, value)` pairs it emits.
pub type MapFn = Arc<dyn Fn(&ConflictedDocument) -> Vec<(Value, Value)> + Send + Sync>;

/// Native counterpart of the resolver's conflict view.
///
/// Emits the list of conflicting revision tokens as the key for every document
/// that has at least one conflict.
pub fn conflicts_map() -> MapFn {
    Arc::new(|doc: &ConflictedDocument| {
        if !doc.has_conflicts() {
            return Vec::new();
        }
        let key = doc
            .conflicts
            .iter()
            .map(|rev| Value::String(rev.to_string()))
            .collect();
        vec![(Value::Array(key), Value::Null)]
    })
}
