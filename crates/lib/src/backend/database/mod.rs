//! Document store implementations
//!
//! `InMemory` keeps revision trees in process memory; `CouchDb` speaks to a
//! CouchDB-compatible server over HTTP.

#[cfg(feature = "couchdb")]
pub mod couchdb;
mod in_memory;

#[cfg(feature = "couchdb")]
pub use couchdb::{CouchDb, CouchDbConfig};
pub use in_memory::{InMemory, MapFn, conflicts_map};
