// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Retrieval-augmented generation
//!
//! embed query -> vector search -> rerank -> prompt assembly -> completion.
//! Steps run sequentially within the calling task. Any failure is logged
//! and returned as is; there is no retry and no fallback answer.

use super::completion::CompletionClient;
use super::errors::{RagError, Result};
use super::reranker::{Reranker, DEFAULT_TOP_K};
use super::types::{ChatTurn, Document};
use crate::embeddings::Embedder;
use crate::vector::VectorStore;
use std::sync::Arc;
use tracing::{debug, error};

/// Candidates fetched from the vector store before reranking
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 5;

/// Response text plus the source labels of the documents used as context
#[derive(Debug, Clone, PartialEq)]
pub struct RagAnswer {
    pub response: String,
    pub sources: Vec<String>,
}

pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    reranker: Reranker,
    completion: Arc<CompletionClient>,
    retrieval_limit: usize,
    top_k: usize,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline")
            .field("embedder", &self.embedder.model_name())
            .field("collection", &self.store.collection_name())
            .field("reranker", &self.reranker)
            .field("completion", &self.completion)
            .field("retrieval_limit", &self.retrieval_limit)
            .field("top_k", &self.top_k)
            .finish()
    }
}

/// System message carrying the retrieved context
pub fn context_message(documents: &[Document]) -> ChatTurn {
    let context = documents
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    ChatTurn::system(format!(
        "Use the following context to answer the user's question:\n\n{}",
        context
    ))
}

/// history, then the context system message, then the new user message
pub fn build_messages(history: &[ChatTurn], documents: &[Document], query: &str) -> Vec<ChatTurn> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.extend_from_slice(history);
    messages.push(context_message(documents));
    messages.push(ChatTurn::user(query));
    messages
}

/// Source labels in rank order, first occurrence wins
fn unique_sources(documents: &[Document]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::with_capacity(documents.len());
    for doc in documents {
        if !sources.contains(&doc.metadata.source) {
            sources.push(doc.metadata.source.clone());
        }
    }
    sources
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        reranker: Reranker,
        completion: Arc<CompletionClient>,
    ) -> Self {
        Self {
            embedder,
            store,
            reranker,
            completion,
            retrieval_limit: DEFAULT_RETRIEVAL_LIMIT,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_limits(mut self, retrieval_limit: usize, top_k: usize) -> Self {
        self.retrieval_limit = retrieval_limit;
        self.top_k = top_k;
        self
    }

    /// Embed, search and rerank; at most `top_k` documents, best first
    pub async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>> {
        let query_embedding = self.embedder.embed(query).await.map_err(|e| {
            error!("Error retrieving documents: {}", e);
            RagError::Embedding(e.to_string())
        })?;

        let results = self
            .store
            .search(&query_embedding, self.retrieval_limit)
            .await
            .map_err(|e| {
                error!("Error retrieving documents: {}", e);
                RagError::from(e)
            })?;
        debug!("Vector search returned {} candidates", results.len());

        let documents: Vec<Document> = results.into_iter().map(Document::from).collect();
        self.reranker.rerank(query, documents, self.top_k)
    }

    pub async fn generate_response(&self, query: &str, history: &[ChatTurn]) -> Result<String> {
        Ok(self.answer(query, history).await?.response)
    }

    /// Same as [`generate_response`](Self::generate_response), also
    /// reporting which sources were used as context
    pub async fn answer(&self, query: &str, history: &[ChatTurn]) -> Result<RagAnswer> {
        let documents = self.get_relevant_documents(query).await?;
        let messages = build_messages(history, &documents, query);

        let response = self.completion.complete(&messages).await.map_err(|e| {
            error!("Error generating response: {}", e);
            e
        })?;

        Ok(RagAnswer {
            response,
            sources: unique_sources(&documents),
        })
    }
}
