//! Tests for idempotent document creation.

use deconflict::{
    Document, DocumentStore, ResolverConfig, backend::database::InMemory,
    constants::{MSG_DOCUMENTS_UNCHANGED, MSG_DOCUMENTS_WRITTEN},
    ensure_documents,
    resolve::resolver_design_document,
};
use serde_json::json;

use crate::helpers::*;

#[tokio::test]
async fn test_install_is_idempotent() {
    let store = InMemory::new();
    let design = resolver_design_document(&ResolverConfig::default());

    let first = ensure_documents(&store, vec![design.clone()]).await;
    assert!(first.success);
    assert_eq!(first.message, MSG_DOCUMENTS_WRITTEN);
    assert_eq!(first.writes(), 1);

    let second = ensure_documents(&store, vec![design]).await;
    assert!(second.success);
    assert_eq!(second.message, MSG_DOCUMENTS_UNCHANGED);
    assert_eq!(second.writes(), 0);
    assert!(second.value.is_none());
}

#[tokio::test]
async fn test_changed_documents_are_updated() {
    let store = InMemory::new();
    let rev = store
        .put(Document::new("settings").with_field("mode", "fast"))
        .await
        .unwrap();

    let resolution = ensure_documents(
        &store,
        vec![
            Document::new("settings").with_field("mode", "safe"),
            Document::new("fresh").with_field("n", 1),
        ],
    )
    .await;
    assert!(resolution.success);
    assert_eq!(resolution.writes(), 2);
    assert!(resolution.value.as_ref().unwrap().is_clean());

    let current = store.get_with_conflicts("settings").await.unwrap();
    assert_eq!(current.doc.get("mode"), Some(&json!("safe")));
    assert_eq!(
        current.doc.rev.as_ref().unwrap().generation(),
        Some(rev.generation().unwrap() + 1)
    );
    assert!(!current.has_conflicts());
}

#[tokio::test]
async fn test_only_differing_documents_are_written() {
    let store = InMemory::new();
    store
        .put(Document::new("same").with_field("n", 1))
        .await
        .unwrap();

    let resolution = ensure_documents(
        &store,
        vec![
            Document::new("same").with_field("n", 1),
            Document::new("other").with_field("n", 2),
        ],
    )
    .await;
    assert!(resolution.success);
    let outcome = resolution.value.unwrap();
    assert_eq!(outcome.len(), 1);
    assert_eq!(outcome.rows()[0].id, "other");
}

#[tokio::test]
async fn test_deleted_documents_are_recreated() {
    let store = InMemory::new();
    let rev = store
        .put(Document::new("gone").with_field("n", 1))
        .await
        .unwrap();
    store
        .bulk_write(vec![Document::tombstone("gone", rev)])
        .await
        .unwrap();

    let resolution = ensure_documents(&store, vec![Document::new("gone").with_field("n", 1)]).await;
    assert!(resolution.success);
    assert_eq!(resolution.writes(), 1);
    assert!(store.get_with_conflicts("gone").await.is_ok());
}

#[tokio::test]
async fn test_lost_race_counts_as_installed() {
    let inner = InMemory::new();
    let design = resolver_design_document(&ResolverConfig::default());
    inner.put(design.clone()).await.unwrap();

    // The listing misses the existing document, so the create is rejected as a conflict.
    let store = FaultyStore::new(inner).hiding_existing();
    let resolution = ensure_documents(&store, vec![design]).await;
    assert!(resolution.success);
    let outcome = resolution.value.unwrap();
    assert_eq!(outcome.failed().count(), 1);
    assert_eq!(outcome.failed().next().unwrap().error.as_deref(), Some("conflict"));
}

#[tokio::test]
async fn test_read_failure_aborts_before_writing() {
    let store = FaultyStore::new(InMemory::new()).failing(Op::AllById);
    let resolution = ensure_documents(&store, vec![Document::new("a")]).await;
    assert!(!resolution.success);
    assert!(resolution.error.unwrap().is_fetch_error());
    assert_eq!(store.calls(Op::BulkWrite), 0);
}

#[tokio::test]
async fn test_write_failure_is_reported() {
    let store = FaultyStore::new(InMemory::new()).failing(Op::BulkWrite);
    let resolution = ensure_documents(&store, vec![Document::new("a")]).await;
    assert!(!resolution.success);
    let err = resolution.error.unwrap();
    assert!(err.is_write_error());
    assert!(!err.is_not_found());
    assert!(store.inner().ids().await.is_empty());
}

#[tokio::test]
async fn test_row_error_aborts_before_writing() {
    let store = FaultyStore::new(InMemory::new()).with_row_error("unauthorized");
    let resolution = ensure_documents(&store, vec![Document::new("a")]).await;
    assert!(!resolution.success);
    assert!(resolution.error.unwrap().is_fetch_error());
    assert_eq!(store.calls(Op::AllById), 1);
    assert_eq!(store.calls(Op::BulkWrite), 0);
}

#[tokio::test]
async fn test_rejected_row_fails_the_install() {
    let store = FaultyStore::new(InMemory::new()).rejecting_writes("forbidden");
    let design = resolver_design_document(&ResolverConfig::default());
    let resolution = ensure_documents(&store, vec![design]).await;
    assert!(!resolution.success);
    assert!(resolution.error.unwrap().is_write_error());

    // The rejected row is still reported.
    let outcome = resolution.value.unwrap();
    assert_eq!(outcome.failed().next().unwrap().error.as_deref(), Some("forbidden"));
    assert!(store.inner().ids().await.is_empty());
}
