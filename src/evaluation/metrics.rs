// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::embeddings::{cosine_similarity, Embedder};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::hash::Hash;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetrievalMetrics {
    #[serde(rename = "precision@k")]
    pub precision: f64,
    #[serde(rename = "recall@k")]
    pub recall: f64,
    #[serde(rename = "f1@k")]
    pub f1: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponseQuality {
    pub semantic_similarity: f32,
    /// `len(response) / len(reference)` in characters, 0 for an empty reference
    pub length_ratio: f64,
}

/// Precision, recall and F1 over the first `k` retrieved ids
///
/// Duplicate ids count once.
pub fn retrieval_metrics<T: Eq + Hash>(retrieved: &[T], relevant: &[T], k: usize) -> RetrievalMetrics {
    let retrieved: HashSet<&T> = retrieved.iter().take(k).collect();
    let relevant: HashSet<&T> = relevant.iter().collect();
    let hits = retrieved.intersection(&relevant).count() as f64;

    let precision = if k > 0 { hits / k as f64 } else { 0.0 };
    let recall = if relevant.is_empty() {
        0.0
    } else {
        hits / relevant.len() as f64
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    RetrievalMetrics {
        precision,
        recall,
        f1,
    }
}

async fn embed_logged(embedder: &dyn Embedder, text: &str) -> Result<Vec<f32>> {
    embedder.embed(text).await.map_err(|e| {
        error!("Error calculating semantic similarity: {:#}", e);
        e
    })
}

pub async fn semantic_similarity(embedder: &dyn Embedder, a: &str, b: &str) -> Result<f32> {
    let first = embed_logged(embedder, a)
        .await
        .context("Error calculating semantic similarity")?;
    let second = embed_logged(embedder, b)
        .await
        .context("Error calculating semantic similarity")?;
    Ok(cosine_similarity(&first, &second))
}

pub async fn response_quality(
    embedder: &dyn Embedder,
    response: &str,
    reference: &str,
) -> Result<ResponseQuality> {
    let semantic_similarity = semantic_similarity(embedder, response, reference)
        .await
        .map_err(|e| {
            error!("Error calculating response quality: {:#}", e);
            e
        })?;

    let reference_len = reference.chars().count();
    let length_ratio = if reference_len > 0 {
        response.chars().count() as f64 / reference_len as f64
    } else {
        0.0
    };

    Ok(ResponseQuality {
        semantic_similarity,
        length_ratio,
    })
}
