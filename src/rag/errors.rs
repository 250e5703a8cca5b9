// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the retrieval and generation pipeline

use crate::vector::VectorStoreError;
use thiserror::Error;

/// Failures of a single pipeline step. None of them are retried.
#[derive(Error, Debug)]
pub enum RagError {
    /// Query or document could not be embedded
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Vector store unavailable or rejected the request
    #[error("Vector search failed: {0}")]
    VectorStore(#[from] VectorStoreError),

    /// Cross-encoder scoring failed
    #[error("Reranking failed: {0}")]
    Rerank(String),

    /// Transport error or non-2xx status from the completion endpoint
    #[error("Completion request failed: {0}")]
    Completion(String),

    /// Completion endpoint answered 2xx with an unusable body
    #[error("Invalid response format from completion API: {0}")]
    InvalidCompletion(String),
}

pub type Result<T> = std::result::Result<T, RagError>;
