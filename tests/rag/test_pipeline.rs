// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Pipeline orchestration against the in-process store

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;

use crate::common::{seeded_store, spawn_answering_server, spawn_completion_server, test_pipeline};
use support_rag_node::{
    embeddings::{HashEmbedder, MINILM_DIMENSION},
    rag::{ChatTurn, CompletionClient, LexicalScorer, RagError, RagPipeline, Reranker},
    vector::InMemoryVectorStore,
};

#[tokio::test]
async fn test_relevant_documents_bounded_by_top_k() {
    let fake = spawn_answering_server("unused").await;
    let pipeline = test_pipeline(&fake.url).await;

    let documents = pipeline
        .get_relevant_documents("What is your return policy?")
        .await
        .unwrap();

    assert!(!documents.is_empty());
    assert!(documents.len() <= 3);
    assert!(documents.iter().any(|d| d.metadata.source == "returns.md"));
}

#[tokio::test]
async fn test_generate_response_trims_answer() {
    let fake = spawn_answering_server("\n  Items can be returned within 30 days.  \n").await;
    let pipeline = test_pipeline(&fake.url).await;

    let response = pipeline
        .generate_response("What is your return policy?", &[])
        .await
        .unwrap();

    assert_eq!(response, "Items can be returned within 30 days.");
}

#[tokio::test]
async fn test_answer_sends_history_first() {
    let fake = spawn_answering_server("ok").await;
    let pipeline = test_pipeline(&fake.url).await;
    let history = vec![
        ChatTurn::user("I bought a laptop"),
        ChatTurn::assistant("Great, how can I help?"),
    ];

    let answer = pipeline.answer("Is it under warranty?", &history).await.unwrap();
    assert_eq!(answer.response, "ok");

    let requests = fake.requests.lock().await;
    let messages = requests[0]["payload"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["content"], "I bought a laptop");
    assert_eq!(messages[2]["role"], "system");
    assert_eq!(messages[3]["content"], "Is it under warranty?");
}

#[tokio::test]
async fn test_empty_store_still_calls_completion() {
    let fake = spawn_answering_server("I could not find that.").await;
    let embedder = Arc::new(HashEmbedder::new(MINILM_DIMENSION).unwrap());
    let store = Arc::new(InMemoryVectorStore::new("empty", MINILM_DIMENSION));
    let completion = CompletionClient::new(&fake.url, "key", "usf1-mini").unwrap();
    let pipeline = RagPipeline::new(
        embedder,
        store,
        Reranker::new(Arc::new(LexicalScorer)),
        Arc::new(completion),
    );

    let answer = pipeline.answer("Anything?", &[]).await.unwrap();
    assert_eq!(answer.response, "I could not find that.");
    assert!(answer.sources.is_empty());

    let requests = fake.requests.lock().await;
    assert_eq!(
        requests[0]["payload"]["messages"][0]["content"],
        "Use the following context to answer the user's question:\n\n"
    );
}

#[tokio::test]
async fn test_dimension_mismatch_propagates() {
    let fake = spawn_answering_server("unused").await;
    let embedder = Arc::new(HashEmbedder::new(MINILM_DIMENSION).unwrap());
    let small = HashEmbedder::new(16).unwrap();
    let store = seeded_store(&small).await;
    let completion = CompletionClient::new(&fake.url, "key", "usf1-mini").unwrap();
    let pipeline = RagPipeline::new(
        embedder,
        store,
        Reranker::new(Arc::new(LexicalScorer)),
        Arc::new(completion),
    );

    let err = pipeline.answer("refunds", &[]).await.unwrap_err();
    assert!(matches!(err, RagError::VectorStore(_)));
    assert!(fake.requests.lock().await.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_completion_error() {
    let fake = spawn_completion_server(StatusCode::UNAUTHORIZED, json!({"error": "bad key"})).await;
    let pipeline = test_pipeline(&fake.url).await;

    let err = pipeline.generate_response("refunds", &[]).await.unwrap_err();
    assert!(matches!(err, RagError::Completion(_)));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_completion() {
    let fake = spawn_completion_server(StatusCode::OK, json!({"unexpected": true})).await;
    let pipeline = test_pipeline(&fake.url).await;

    let err = pipeline.generate_response("refunds", &[]).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidCompletion(_)));
}

#[tokio::test]
async fn test_limits_respected() {
    let fake = spawn_answering_server("ok").await;
    let pipeline = test_pipeline(&fake.url).await.with_limits(2, 1);

    let documents = pipeline.get_relevant_documents("shipping time").await.unwrap();
    assert_eq!(documents.len(), 1);
}
