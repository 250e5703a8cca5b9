// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Source label used when a document does not name one
pub const UNKNOWN_SOURCE: &str = "unknown";

fn default_source() -> String {
    UNKNOWN_SOURCE.to_string()
}

fn empty_metadata() -> Value {
    Value::Object(Default::default())
}

/// A document to be written to the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentInput {
    pub content: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "empty_metadata")]
    pub metadata: Value,
}

impl DocumentInput {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            metadata: empty_metadata(),
        }
    }
}

/// A stored document returned by a similarity search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredDocument {
    pub content: String,
    pub source: String,
    /// Cosine similarity to the query vector
    pub score: f32,
    pub metadata: Value,
}

#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("Invalid vector dimensions: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid vector values: contains NaN or Infinity")]
    NonFiniteValue,

    #[error("Got {documents} documents but {vectors} vectors")]
    CountMismatch { documents: usize, vectors: usize },

    #[error("Vector store request failed: {0}")]
    Backend(String),
}
