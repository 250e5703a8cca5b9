// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vector store clients
//!
//! Documents are stored as (id, vector, payload) points and retrieved by
//! cosine similarity. Two backends implement [`VectorStore`]: a Qdrant
//! collection and an in-process store.

pub mod memory;
pub mod qdrant;
pub mod types;

pub use memory::InMemoryVectorStore;
pub use qdrant::QdrantVectorStore;
pub use types::{DocumentInput, ScoredDocument, VectorStoreError};

use async_trait::async_trait;

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if it does not exist yet. Safe to call repeatedly.
    async fn ensure_collection(&self) -> Result<(), VectorStoreError>;

    /// Store documents with their vectors, returning the number written.
    ///
    /// Points get ids `0..documents.len()` on every call, so a second call
    /// overwrites the points written by the first.
    async fn upsert(
        &self,
        documents: &[DocumentInput],
        vectors: &[Vec<f32>],
    ) -> Result<usize, VectorStoreError>;

    /// Up to `limit` nearest documents, most similar first
    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredDocument>, VectorStoreError>;

    fn collection_name(&self) -> &str;
}

/// Shared argument checks for [`VectorStore::upsert`]
pub(crate) fn validate_upsert(
    documents: &[DocumentInput],
    vectors: &[Vec<f32>],
    dimension: usize,
) -> Result<(), VectorStoreError> {
    if documents.len() != vectors.len() {
        return Err(VectorStoreError::CountMismatch {
            documents: documents.len(),
            vectors: vectors.len(),
        });
    }
    for vector in vectors {
        validate_vector(vector, dimension)?;
    }
    Ok(())
}

pub(crate) fn validate_vector(vector: &[f32], dimension: usize) -> Result<(), VectorStoreError> {
    if vector.len() != dimension {
        return Err(VectorStoreError::DimensionMismatch {
            expected: dimension,
            actual: vector.len(),
        });
    }
    // NaN or Infinity would break similarity calculations
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(VectorStoreError::NonFiniteValue);
    }
    Ok(())
}
