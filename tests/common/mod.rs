// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures: a fake completion endpoint and a fully wired AppState
//! backed by the in-process vector store.
#![allow(dead_code)]

use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use support_rag_node::{
    config::Settings,
    embeddings::{Embedder, HashEmbedder, MINILM_DIMENSION},
    rag::{CompletionClient, LexicalScorer, RagPipeline, Reranker},
    vector::{DocumentInput, InMemoryVectorStore, VectorStore},
    AppState,
};
use tokio::sync::Mutex;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Requests seen by the fake endpoint: `{"authorization": ..., "payload": ...}`
pub type Captured = Arc<Mutex<Vec<Value>>>;

pub struct FakeCompletion {
    pub url: String,
    pub requests: Captured,
}

/// Serve `body` with `status` for every POST to /v1/chat/completions
pub async fn spawn_completion_server(status: StatusCode, body: Value) -> FakeCompletion {
    let requests: Captured = Arc::new(Mutex::new(Vec::new()));
    let captured = requests.clone();

    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(payload): Json<Value>| {
            let captured = captured.clone();
            let body = body.clone();
            async move {
                let authorization = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                captured
                    .lock()
                    .await
                    .push(json!({"authorization": authorization, "payload": payload}));
                (status, Json(body))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeCompletion {
        url: format!("http://{}/v1/chat/completions", addr),
        requests,
    }
}

pub async fn spawn_answering_server(answer: &str) -> FakeCompletion {
    spawn_completion_server(
        StatusCode::OK,
        json!({
            "id": "chatcmpl-test",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": answer}}]
        }),
    )
    .await
}

pub fn test_settings(llm_api_url: &str) -> Settings {
    let values: HashMap<String, String> = [
        ("SECRET_KEY", TEST_SECRET),
        ("USF_API_URL", llm_api_url),
        ("USF_API_KEY", "usf-test-key"),
        ("QDRANT_URL", "memory"),
        ("MAX_CHAT_HISTORY", "4"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    Settings::from_map(&values).unwrap()
}

pub fn support_documents() -> Vec<DocumentInput> {
    vec![
        DocumentInput::new(
            "Our return policy allows returns of unused items within 30 days of delivery.",
            "returns.md",
        ),
        DocumentInput::new(
            "Standard shipping takes 3 to 5 business days within the country.",
            "shipping.md",
        ),
        DocumentInput::new(
            "Refunds are issued to the original payment method after the return is inspected.",
            "refunds.md",
        ),
        DocumentInput::new(
            "All electronics carry a one year limited warranty against defects.",
            "warranty.md",
        ),
        DocumentInput::new(
            "The return policy does not cover final sale or clearance items.",
            "returns.md",
        ),
    ]
}

/// Store seeded with [`support_documents`] embedded by `embedder`
pub async fn seeded_store(embedder: &dyn Embedder) -> Arc<InMemoryVectorStore> {
    let store = Arc::new(InMemoryVectorStore::new("customer_support_docs", embedder.dimension()));
    let documents = support_documents();
    let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
    let vectors = embedder.embed_batch(&texts).await.unwrap();
    store.upsert(&documents, &vectors).await.unwrap();
    store
}

pub async fn test_pipeline(llm_api_url: &str) -> RagPipeline {
    let embedder = Arc::new(HashEmbedder::new(MINILM_DIMENSION).unwrap());
    let store = seeded_store(embedder.as_ref()).await;
    let completion = CompletionClient::new(llm_api_url, "usf-test-key", "usf1-mini").unwrap();
    RagPipeline::new(
        embedder,
        store,
        Reranker::new(Arc::new(LexicalScorer)),
        Arc::new(completion),
    )
}

pub async fn test_state(llm_api_url: &str) -> Arc<AppState> {
    let settings = test_settings(llm_api_url);
    let pipeline = test_pipeline(llm_api_url).await;
    Arc::new(AppState::new(settings, pipeline).unwrap())
}

pub async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Form-encoded login request for the given credentials
pub fn login_request(username: &str, password: &str) -> axum::http::Request<axum::body::Body> {
    let body = format!(
        "username={}&password={}",
        username.replace('@', "%40"),
        password
    );
    axum::http::Request::builder()
        .method("POST")
        .uri("/api/v1/auth/token")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(body))
        .unwrap()
}

/// Log in as the built-in test user and return the bearer token
pub async fn obtain_token(app: &Router) -> String {
    use tower::util::ServiceExt;

    let response = app
        .clone()
        .oneshot(login_request("test@example.com", "testpassword123"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}
