// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Session registry: bounded history, expiry and concurrent use

use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use support_rag_node::rag::ChatTurn;
use support_rag_node::session::{SessionError, SessionStore};

const TIMEOUT_MINUTES: u64 = 30;

fn store(max_history: usize) -> SessionStore {
    SessionStore::new(
        std::time::Duration::from_secs(TIMEOUT_MINUTES * 60),
        max_history,
    )
}

#[tokio::test]
async fn test_history_never_exceeds_limit() {
    let store = store(5);
    let (id, _) = store.resolve(None).await;

    for i in 0..12 {
        store
            .append(&id, vec![ChatTurn::user(format!("turn-{}", i))])
            .await
            .unwrap();
        assert!(store.history(&id).await.unwrap().len() <= 5);
    }

    let history = store.history(&id).await.unwrap();
    let contents: Vec<String> = history.into_iter().map(|t| t.content).collect();
    assert_eq!(
        contents,
        vec!["turn-7", "turn-8", "turn-9", "turn-10", "turn-11"]
    );
}

#[tokio::test]
async fn test_oversized_append_keeps_tail() {
    let store = store(2);
    let (id, _) = store.resolve(None).await;
    store
        .append(
            &id,
            vec![ChatTurn::user("a"), ChatTurn::assistant("b"), ChatTurn::user("c")],
        )
        .await
        .unwrap();
    let history = store.history(&id).await.unwrap();
    assert_eq!(history, vec![ChatTurn::assistant("b"), ChatTurn::user("c")]);
}

#[tokio::test]
async fn test_resolve_none_always_fresh() {
    let store = store(10);
    let mut seen = HashSet::new();
    for _ in 0..100 {
        let (id, created) = store.resolve(None).await;
        assert!(created);
        assert!(seen.insert(id));
    }
    assert_eq!(store.len().await, 100);
}

#[tokio::test]
async fn test_sweep_uses_strict_timeout() {
    let store = store(10);
    let (id, _) = store.resolve(None).await;
    let last_activity = store.get(&id).await.unwrap().last_activity;
    let timeout = Duration::minutes(TIMEOUT_MINUTES as i64);

    assert_eq!(store.sweep_at(last_activity + timeout).await, 0);
    assert!(store.get(&id).await.is_some());

    assert_eq!(
        store
            .sweep_at(last_activity + timeout + Duration::milliseconds(1))
            .await,
        1
    );
    assert!(store.get(&id).await.is_none());
    assert_eq!(
        store.touch(&id).await,
        Err(SessionError::NotFound(id.clone()))
    );
}

#[tokio::test]
async fn test_sweep_within_timeout_removes_nothing() {
    let store = store(10);
    let (id, _) = store.resolve(None).await;
    store.resolve(None).await;

    assert_eq!(store.sweep_at(Utc::now() + Duration::minutes(29)).await, 0);
    assert!(store.get(&id).await.is_some());

    assert_eq!(store.sweep_at(Utc::now() + Duration::minutes(31)).await, 2);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_sweep_now_keeps_active_sessions() {
    let store = store(10);
    store.resolve(None).await;
    store.resolve(None).await;
    assert_eq!(store.sweep().await, 0);
    assert_eq!(store.len().await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_are_not_lost() {
    let store = Arc::new(store(1000));
    let (id, _) = store.resolve(None).await;

    let mut handles = Vec::new();
    for worker in 0..8 {
        let store = store.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                store
                    .append(
                        &id,
                        vec![
                            ChatTurn::user(format!("{}-{}", worker, i)),
                            ChatTurn::assistant("ack"),
                        ],
                    )
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let history = store.history(&id).await.unwrap();
    assert_eq!(history.len(), 8 * 25 * 2);
    // user/assistant pairs stay adjacent
    for pair in history.chunks(2) {
        assert_eq!(pair[1].content, "ack");
    }
}
