// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the in-memory backend.

use std::time::Duration;

use bytes::Bytes;
use readthru_memory::InMemoryBackend;
use readthru_tier::{CacheBackend, TtlPolicy};

const PAYLOAD: Bytes = Bytes::from_static(br#"[{"id":1,"name":"CS"}]"#);

#[tokio::test]
async fn get_returns_stored_payload() {
    let backend = InMemoryBackend::new();
    assert_eq!(backend.get("S_42_C").await.unwrap(), None);

    backend.set("S_42_C", PAYLOAD, TtlPolicy::Never).await.unwrap();

    assert_eq!(backend.get("S_42_C").await.unwrap(), Some(PAYLOAD));
    assert!(backend.contains("S_42_C"));
}

#[tokio::test]
async fn set_overwrites_previous_payload() {
    let backend = InMemoryBackend::new();
    backend.set("k", Bytes::from_static(b"1"), TtlPolicy::Never).await.unwrap();
    backend.set("k", Bytes::from_static(b"2"), TtlPolicy::Never).await.unwrap();

    assert_eq!(backend.get("k").await.unwrap(), Some(Bytes::from_static(b"2")));
}

#[tokio::test]
async fn remove_is_idempotent() {
    let backend = InMemoryBackend::new();
    backend.set("k", PAYLOAD, TtlPolicy::Never).await.unwrap();

    backend.remove("k").await.unwrap();
    backend.remove("k").await.unwrap();

    assert_eq!(backend.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn absolute_entries_expire_after_lifetime() {
    let backend = InMemoryBackend::new();
    backend
        .set("k", PAYLOAD, TtlPolicy::absolute(Duration::from_millis(50)))
        .await
        .unwrap();
    assert!(backend.get("k").await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(backend.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn sliding_entries_survive_while_read() {
    let backend = InMemoryBackend::new();
    backend
        .set("k", PAYLOAD, TtlPolicy::sliding(Duration::from_millis(200)))
        .await
        .unwrap();

    for _ in 0..6 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(backend.get("k").await.unwrap().is_some(), "read should keep the entry alive");
    }

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(backend.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn clones_share_storage() {
    let backend = InMemoryBackend::builder().name("shared").build();
    let clone = backend.clone();

    backend.set("k", PAYLOAD, TtlPolicy::Never).await.unwrap();

    assert_eq!(clone.get("k").await.unwrap(), Some(PAYLOAD));
    assert_eq!(clone.name(), Some("shared"));
}
