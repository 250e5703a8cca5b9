// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-process vector store
//!
//! Holds points in memory and ranks them with exact cosine similarity.
//! Nothing survives a restart.

use super::{validate_upsert, validate_vector, DocumentInput, ScoredDocument, VectorStore, VectorStoreError};
use crate::embeddings::cosine_similarity;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone)]
struct StoredPoint {
    vector: Vec<f32>,
    document: DocumentInput,
}

#[derive(Debug)]
pub struct InMemoryVectorStore {
    collection_name: String,
    dimension: usize,
    points: RwLock<BTreeMap<u64, StoredPoint>>,
}

impl InMemoryVectorStore {
    pub fn new(collection_name: impl Into<String>, dimension: usize) -> Self {
        Self {
            collection_name: collection_name.into(),
            dimension,
            points: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn count(&self) -> usize {
        self.points.read().await.len()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(&self) -> Result<(), VectorStoreError> {
        Ok(())
    }

    async fn upsert(
        &self,
        documents: &[DocumentInput],
        vectors: &[Vec<f32>],
    ) -> Result<usize, VectorStoreError> {
        validate_upsert(documents, vectors, self.dimension)?;

        let mut points = self.points.write().await;
        for (id, (document, vector)) in documents.iter().zip(vectors.iter()).enumerate() {
            points.insert(
                id as u64,
                StoredPoint {
                    vector: vector.clone(),
                    document: document.clone(),
                },
            );
        }

        info!(
            "Added {} documents to collection {}",
            documents.len(),
            self.collection_name
        );
        Ok(documents.len())
    }

    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredDocument>, VectorStoreError> {
        validate_vector(vector, self.dimension)?;

        let points = self.points.read().await;
        let mut results: Vec<ScoredDocument> = points
            .values()
            .map(|point| ScoredDocument {
                content: point.document.content.clone(),
                source: point.document.source.clone(),
                score: cosine_similarity(vector, &point.vector),
                metadata: point.document.metadata.clone(),
            })
            .collect();

        // Stable sort: equal scores stay in id order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }
}
