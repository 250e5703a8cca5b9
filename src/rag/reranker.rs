// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Second-stage relevance scoring
//!
//! Every (query, candidate) pair is scored independently. The reranker then
//! keeps the `top_k` best candidates; equal scores keep their input order.

use super::errors::{RagError, Result};
use super::types::Document;
use crate::embeddings::hashing::tokenize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error};

/// Default number of documents kept after reranking
pub const DEFAULT_TOP_K: usize = 3;

/// Scores (query, candidate) pairs, one score per candidate
pub trait PairScorer: Send + Sync {
    fn score_pairs(&self, query: &str, candidates: &[&str]) -> anyhow::Result<Vec<f32>>;

    fn name(&self) -> &str;
}

#[derive(Clone)]
pub struct Reranker {
    scorer: Arc<dyn PairScorer>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("scorer", &self.scorer.name())
            .finish()
    }
}

impl Reranker {
    pub fn new(scorer: Arc<dyn PairScorer>) -> Self {
        Self { scorer }
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// Return at most `top_k` documents ordered by descending pair score
    pub fn rerank(&self, query: &str, documents: Vec<Document>, top_k: usize) -> Result<Vec<Document>> {
        if documents.is_empty() || top_k == 0 {
            return Ok(vec![]);
        }

        let candidates: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let scores = self.scorer.score_pairs(query, &candidates).map_err(|e| {
            error!("Error reranking documents: {}", e);
            RagError::Rerank(e.to_string())
        })?;

        if scores.len() != documents.len() {
            error!(
                "Scorer returned {} scores for {} documents",
                scores.len(),
                documents.len()
            );
            return Err(RagError::Rerank(format!(
                "expected {} scores, got {}",
                documents.len(),
                scores.len()
            )));
        }

        let mut scored: Vec<(Document, f32)> = documents.into_iter().zip(scores).collect();
        // sort_by is stable
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        debug!(
            "Reranked with {}: kept {} documents",
            self.scorer.name(),
            scored.len()
        );

        Ok(scored.into_iter().map(|(doc, _)| doc).collect())
    }
}

/// Fraction of distinct query terms that appear in the candidate
///
/// Used when no cross-encoder model is available.
#[derive(Debug, Default, Clone)]
pub struct LexicalScorer;

impl PairScorer for LexicalScorer {
    fn score_pairs(&self, query: &str, candidates: &[&str]) -> anyhow::Result<Vec<f32>> {
        let query_terms: HashSet<String> = tokenize(query).collect();
        if query_terms.is_empty() {
            return Ok(vec![0.0; candidates.len()]);
        }

        Ok(candidates
            .iter()
            .map(|candidate| {
                let terms: HashSet<String> = tokenize(candidate).collect();
                let hits = query_terms.intersection(&terms).count();
                hits as f32 / query_terms.len() as f32
            })
            .collect())
    }

    fn name(&self) -> &str {
        "lexical-overlap"
    }
}
