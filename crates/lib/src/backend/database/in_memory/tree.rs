//! Revision tree for one document id.
//!
//! Every revision points at its parent; leaves are revisions nothing points at.
//! The winning leaf follows the CouchDB rule: live leaves beat tombstones, then the
//! highest generation wins, then the highest token.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use crate::Result;
use crate::backend::errors::StoreError;
use crate::document::{Document, Rev};

/// Number of hex characters kept from the content hash in a new token.
const REV_HASH_LEN: usize = 32;

#[derive(Debug, Clone)]
struct RevNode {
    parent: Option<Rev>,
    doc: Document,
}

/// All stored revisions of one id.
#[derive(Debug, Clone, Default)]
pub(crate) struct RevTree {
    nodes: HashMap<Rev, RevNode>,
}

impl RevTree {
    /// The stored body of a revision.
    pub(crate) fn get(&self, rev: &Rev) -> Option<&Document> {
        self.nodes.get(rev).map(|node| &node.doc)
    }

    pub(crate) fn is_leaf(&self, rev: &Rev) -> bool {
        self.nodes.contains_key(rev)
            && !self
                .nodes
                .values()
                .any(|node| node.parent.as_ref() == Some(rev))
    }

    /// All leaves, winner first.
    pub(crate) fn leaves(&self) -> Vec<&Document> {
        let parents: HashSet<&Rev> = self
            .nodes
            .values()
            .filter_map(|node| node.parent.as_ref())
            .collect();
        let mut leaves: Vec<&Document> = self
            .nodes
            .iter()
            .filter(|(rev, _)| !parents.contains(rev))
            .map(|(_, node)| &node.doc)
            .collect();
        leaves.sort_by(|a, b| winner_order(a, b));
        leaves
    }

    /// The winning leaf, tombstoned or not.
    pub(crate) fn winner(&self) -> Option<&Document> {
        self.leaves().into_iter().next()
    }

    /// The winning leaf, if it is live.
    pub(crate) fn live_winner(&self) -> Option<&Document> {
        self.winner().filter(|doc| !doc.deleted)
    }

    /// Tokens of the live leaves other than the winner, in winner order.
    pub(crate) fn conflicts(&self) -> Vec<Rev> {
        self.leaves()
            .into_iter()
            .skip(1)
            .filter(|doc| !doc.deleted)
            .filter_map(|doc| doc.rev.clone())
            .collect()
    }

    /// Applies a write with compare-and-swap semantics.
    ///
    /// A write without a revision is accepted only when the id has no live winner.
    /// A write with a revision is accepted only when that revision is a current leaf.
    pub(crate) fn apply(&mut self, doc: Document) -> Result<Rev> {
        let parent = match &doc.rev {
            None => match self.winner() {
                Some(winner) if !winner.deleted => {
                    return Err(StoreError::Conflict { id: doc.id }.into());
                }
                Some(winner) => winner.rev.clone(),
                None => None,
            },
            Some(rev) if self.is_leaf(rev) => Some(rev.clone()),
            Some(_) => return Err(StoreError::Conflict { id: doc.id }.into()),
        };
        self.insert(parent, doc)
    }

    /// Inserts a revision under `parent` without checking that `parent` is a leaf.
    pub(crate) fn insert(&mut self, parent: Option<Rev>, mut doc: Document) -> Result<Rev> {
        if let Some(parent) = parent.as_ref().filter(|rev| !self.nodes.contains_key(*rev)) {
            return Err(StoreError::StateInconsistency {
                reason: format!("parent revision {parent} of {} is not stored", doc.id),
            }
            .into());
        }
        if doc.deleted {
            doc.fields.clear();
        }
        let rev = next_rev(parent.as_ref(), &doc)?;
        doc.rev = Some(rev.clone());
        self.nodes.insert(rev.clone(), RevNode { parent, doc });
        Ok(rev)
    }
}

/// Orders leaves so the winner comes first.
fn winner_order(a: &Document, b: &Document) -> Ordering {
    let generation = |doc: &Document| doc.rev.as_ref().and_then(Rev::generation).unwrap_or(0);
    a.deleted
        .cmp(&b.deleted)
        .then_with(|| generation(b).cmp(&generation(a)))
        .then_with(|| b.rev.cmp(&a.rev))
}

/// Derives the token of a new revision from its parent and content.
fn next_rev(parent: Option<&Rev>, doc: &Document) -> Result<Rev> {
    let generation = parent.and_then(Rev::generation).unwrap_or(0) + 1;
    let mut hasher = Sha256::new();
    if let Some(parent) = parent {
        hasher.update(parent.as_str().as_bytes());
    }
    hasher.update([u8::from(doc.deleted)]);
    hasher.update(serde_json::to_vec(&doc.fields)?);
    let digest = hex::encode(hasher.finalize());
    Ok(Rev::from_parts(generation, &digest[..REV_HASH_LEN]))
}
