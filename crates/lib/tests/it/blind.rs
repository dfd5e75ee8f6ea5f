//! Tests for blind resolution.

use deconflict::{
    DocId, Document, DocumentStore, Scope, backend::database::InMemory, blind,
    constants::{MSG_EMPTY_SCOPE, MSG_NO_CONFLICTS, MSG_RESOLVED},
};
use serde_json::json;

use crate::helpers::*;

#[tokio::test]
async fn test_no_conflicts_writes_nothing() {
    let store = InMemory::new();
    store.put(Document::new("a").with_field("n", 1)).await.unwrap();
    store.put(Document::new("b").with_field("n", 2)).await.unwrap();

    let resolution = blind(&store, Scope::All).await;
    assert!(resolution.success);
    assert_eq!(resolution.message, MSG_NO_CONFLICTS);
    assert_eq!(resolution.writes(), 0);

    // The conflict view was installed along the way.
    assert!(store.ids().await.contains(&"_design/resolver".to_string()));
}

#[tokio::test]
async fn test_all_tombstones_every_non_winning_leaf() {
    let store = InMemory::new();
    conflicted(
        &store,
        "a",
        vec![leaf("a", "n", 1), leaf("a", "n", 2), leaf("a", "n", 3)],
    )
    .await;
    conflicted(&store, "b", vec![leaf("b", "n", 1), leaf("b", "n", 2)]).await;
    conflicted(&store, "c", vec![leaf("c", "n", 1)]).await;

    let ids = ["a", "b", "c"];
    let before = total_live_leaves(&store, &ids).await;
    assert_eq!(before, 6);
    let winners: Vec<Document> = winners_of(&store, &ids).await;

    let resolution = blind(&store, Scope::All).await;
    assert!(resolution.success);
    assert_eq!(resolution.message, MSG_RESOLVED);
    assert_eq!(resolution.writes(), before - ids.len());
    assert!(resolution.value.as_ref().unwrap().is_clean());

    // One live leaf per document, and it is the leaf that was winning before.
    for (id, winner) in ids.iter().zip(winners) {
        let live = live_leaves(&store, id).await;
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].rev, winner.rev);
    }

    let again = blind(&store, Scope::All).await;
    assert!(again.success);
    assert_eq!(again.writes(), 0);
}

async fn winners_of(store: &InMemory, ids: &[&str]) -> Vec<Document> {
    let mut winners = Vec::new();
    for id in ids {
        winners.push(store.get_with_conflicts(id).await.unwrap().doc);
    }
    winners
}

#[tokio::test]
async fn test_explicit_ids_keep_first_live_leaf() {
    let store = InMemory::new();
    conflicted(
        &store,
        "a",
        vec![leaf("a", "n", 1), leaf("a", "n", 2), leaf("a", "n", 3)],
    )
    .await;
    conflicted(&store, "b", vec![leaf("b", "n", 1), leaf("b", "n", 2)]).await;
    let first = live_leaves(&store, "a").await.remove(0);

    let resolution = blind(&store, Scope::one("a").unwrap()).await;
    assert!(resolution.success);
    assert_eq!(resolution.writes(), 2);

    let live = live_leaves(&store, "a").await;
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].rev, first.rev);

    // Documents outside the scope are untouched.
    assert_eq!(live_leaves(&store, "b").await.len(), 2);
    // Resolving by id never installs the view.
    assert!(!store.ids().await.contains(&"_design/resolver".to_string()));
}

#[tokio::test]
async fn test_explicit_ids_skip_unknown_and_duplicates() {
    let store = InMemory::new();
    conflicted(&store, "a", vec![leaf("a", "n", 1), leaf("a", "n", 2)]).await;

    let resolution = blind(&store, Scope::many(["a", "missing", "a"]).unwrap()).await;
    assert!(resolution.success);
    assert_eq!(resolution.writes(), 1);

    let resolution = blind(&store, Scope::many(["missing"]).unwrap()).await;
    assert!(resolution.success);
    assert_eq!(resolution.message, MSG_NO_CONFLICTS);
    assert_eq!(resolution.writes(), 0);
}

#[tokio::test]
async fn test_empty_scope_is_a_no_op() {
    let store = FaultyStore::new(InMemory::new());
    let resolution = blind(&store, Scope::Many(Vec::new())).await;
    assert!(resolution.success);
    assert_eq!(resolution.message, MSG_EMPTY_SCOPE);
    assert_eq!(store.calls(Op::OpenRevisions), 0);
    assert_eq!(store.calls(Op::BulkWrite), 0);
}

#[tokio::test]
async fn test_single_leaf_is_a_no_op() {
    let store = InMemory::new();
    store.put(Document::new("a").with_field("n", 1)).await.unwrap();
    let resolution = blind(&store, DocId::new("a").unwrap().into()).await;
    assert!(resolution.success);
    assert_eq!(resolution.writes(), 0);
}

#[tokio::test]
async fn test_tombstoned_leaves_are_ignored() {
    let store = InMemory::new();
    conflicted(
        &store,
        "a",
        vec![leaf("a", "n", 1), leaf("a", "n", 2), leaf("a", "n", 3)],
    )
    .await;
    let loser = store.get_with_conflicts("a").await.unwrap().conflicts[0].clone();
    store
        .bulk_write(vec![Document::tombstone("a", loser)])
        .await
        .unwrap();

    let resolution = blind(&store, Scope::one("a").unwrap()).await;
    assert_eq!(resolution.writes(), 1);
    assert_eq!(live_leaves(&store, "a").await.len(), 1);
}

#[tokio::test]
async fn test_view_rows_with_errors_are_skipped() {
    let inner = InMemory::new();
    conflicted(&inner, "a", vec![leaf("a", "n", 1), leaf("a", "n", 2)]).await;
    let store = FaultyStore::new(inner).with_view_rows(vec![
        serde_json::from_value(json!({"key": ["2-x"], "error": "not_found"})).unwrap(),
        serde_json::from_value(json!({"id": "z", "key": "not-a-list", "value": null})).unwrap(),
    ]);

    let resolution = blind(&store, Scope::All).await;
    assert!(resolution.success);
    assert_eq!(resolution.writes(), 1);
    assert_eq!(live_leaves(&store, "a").await.len(), 1);
}

#[tokio::test]
async fn test_stale_tombstones_do_not_fail_the_resolution() {
    let inner = InMemory::new();
    conflicted(&inner, "a", vec![leaf("a", "n", 1), leaf("a", "n", 2)]).await;
    let store = FaultyStore::new(inner).with_view_rows(vec![
        serde_json::from_value(json!({"id": "a", "key": ["2-gone"], "value": null})).unwrap(),
    ]);

    let resolution = blind(&store, Scope::All).await;
    assert!(resolution.success);
    let outcome = resolution.value.unwrap();
    assert_eq!(outcome.len(), 2);
    assert_eq!(outcome.written().count(), 1);
    assert_eq!(outcome.failed().count(), 1);
}
