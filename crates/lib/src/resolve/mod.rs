//! Conflict resolution policies.
//!
//! Each policy is a short pipeline against a [`DocumentStore`]: read the revision
//! data, decide which leaves lose, then submit their tombstones (and, for merge,
//! the updated winner) in one batch write. Every step is awaited before the next
//! starts. Policies hold no state between calls and take no locks; two callers
//! resolving the same id concurrently are arbitrated only by the store's revision
//! check, which rejects writes naming a revision that is no longer a leaf.
//!
//! Every entry point returns a [`Resolution`]. "Nothing to do" is a success and
//! store failures are reported as `success: false`; only malformed ids are errors,
//! and those are caught when building a [`DocId`] or [`Scope`].
//!
//! ```
//! # use deconflict::{Document, Scope, backend::database::InMemory};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> deconflict::Result<()> {
//! let store = InMemory::new();
//! let root = store.put(Document::new("foo").with_field("count", 1)).await?;
//! store.graft(Document::new("foo").with_field("count", 3), Some(&root)).await?;
//! store.graft(Document::new("foo").with_field("count", 4), Some(&root)).await?;
//!
//! let resolution = deconflict::blind(&store, Scope::All).await;
//! assert!(resolution.success);
//! assert_eq!(resolution.writes(), 1);
//! # Ok(())
//! # }
//! ```

mod commit;
mod errors;
mod filter;
mod installer;
mod outcome;
mod policy;
mod scope;

pub use commit::commit;
pub use errors::ResolveError;
pub use filter::live_revisions;
pub use installer::{ensure_documents, resolver_design_document};
pub use outcome::{BatchOutcome, Resolution};
pub use policy::latest::{compare_timestamps, timestamp};
pub use policy::merge::merge_fields;
pub use scope::{DocId, Scope};

use std::sync::Arc;

use tracing::info;

use crate::backend::DocumentStore;
use crate::config::ResolverConfig;
use crate::document::Document;

/// Blind resolution with the default helper view names.
///
/// With [`Scope::All`] the helper view is installed if needed and every conflict it
/// lists is tombstoned, leaving each document's current winner. With explicit ids,
/// each document keeps the first live leaf of its open-revisions enumeration.
pub async fn blind(store: &dyn DocumentStore, scope: Scope) -> Resolution {
    Resolver::run_blind(store, &ResolverConfig::default(), scope).await
}

/// Latest-wins resolution: the live leaf with the largest `field` survives.
///
/// Ties on the largest timestamp are broken by the store's enumeration order:
/// the last enumerated leaf among them survives.
pub async fn latest_wins(store: &dyn DocumentStore, id: &DocId, field: &str) -> Resolution {
    info!(id = %id, field, "Resolving conflicts, latest wins");
    policy::latest::resolve(store, id, field).await
}

/// Field-merge resolution: losing leaves' fields are copied onto the winner, then
/// the losers are tombstoned and the winner rewritten in the same batch.
pub async fn merge(store: &dyn DocumentStore, id: &DocId) -> Resolution {
    info!(id = %id, "Resolving conflicts by merging fields");
    policy::merge::resolve(store, id).await
}

/// Runs the resolution policies against one store with one configuration.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn DocumentStore>,
    config: ResolverConfig,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Creates a resolver using the default helper view names.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            config: ResolverConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Helper design document and view names in use.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The store this resolver reads and writes.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// See [`blind`].
    pub async fn blind(&self, scope: Scope) -> Resolution {
        Self::run_blind(self.store.as_ref(), &self.config, scope).await
    }

    /// See [`latest_wins`].
    pub async fn latest_wins(&self, id: &DocId, field: &str) -> Resolution {
        latest_wins(self.store.as_ref(), id, field).await
    }

    /// See [`merge`].
    pub async fn merge(&self, id: &DocId) -> Resolution {
        merge(self.store.as_ref(), id).await
    }

    /// Installs the helper design document without resolving anything.
    pub async fn install_view(&self) -> Resolution {
        ensure_documents(
            self.store.as_ref(),
            vec![resolver_design_document(&self.config)],
        )
        .await
    }

    /// See [`ensure_documents`].
    pub async fn ensure_documents(&self, docs: Vec<Document>) -> Resolution {
        ensure_documents(self.store.as_ref(), docs).await
    }

    async fn run_blind(
        store: &dyn DocumentStore,
        config: &ResolverConfig,
        scope: Scope,
    ) -> Resolution {
        match scope.ids() {
            None => {
                info!(design = %config.design_id(), view = %config.view, "Resolving all conflicts blindly");
                policy::blind::resolve_all(store, config).await
            }
            Some(ids) => {
                info!(count = ids.len(), "Resolving conflicts blindly");
                policy::blind::resolve_ids(store, &ids).await
            }
        }
    }
}
