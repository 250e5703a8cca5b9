// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Reranking contract over arbitrary pair scorers

use std::sync::Arc;
use support_rag_node::rag::{Document, LexicalScorer, PairScorer, Reranker};

/// Scores a candidate by its length, so expected order is easy to read
struct LengthScorer;

impl PairScorer for LengthScorer {
    fn score_pairs(&self, _query: &str, candidates: &[&str]) -> anyhow::Result<Vec<f32>> {
        Ok(candidates.iter().map(|c| c.len() as f32).collect())
    }

    fn name(&self) -> &str {
        "length"
    }
}

fn documents(contents: &[&str]) -> Vec<Document> {
    contents
        .iter()
        .enumerate()
        .map(|(i, c)| Document::new(*c, format!("doc-{}.md", i), 0.0))
        .collect()
}

#[test]
fn test_small_input_returns_everything_sorted() {
    let reranker = Reranker::new(Arc::new(LengthScorer));

    for input in [vec!["bb", "a", "ccc"], vec!["a", "bb"], vec!["only"]] {
        let n = input.len();
        let result = reranker.rerank("q", documents(&input), 3).unwrap();
        assert_eq!(result.len(), n);

        let lengths: Vec<usize> = result.iter().map(|d| d.content.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }
}

#[test]
fn test_large_input_truncated_to_top_k() {
    let reranker = Reranker::new(Arc::new(LengthScorer));
    let result = reranker
        .rerank("q", documents(&["a", "bbbbb", "cc", "dddd", "eee"]), 3)
        .unwrap();
    let contents: Vec<&str> = result.iter().map(|d| d.content.as_str()).collect();
    assert_eq!(contents, vec!["bbbbb", "dddd", "eee"]);
}

#[test]
fn test_metadata_travels_with_document() {
    let reranker = Reranker::new(Arc::new(LengthScorer));
    let result = reranker.rerank("q", documents(&["x", "yyy"]), 3).unwrap();
    assert_eq!(result[0].metadata.source, "doc-1.md");
    assert_eq!(result[1].metadata.source, "doc-0.md");
}

#[test]
fn test_lexical_reranker_prefers_matching_terms() {
    let reranker = Reranker::new(Arc::new(LexicalScorer));
    let result = reranker
        .rerank(
            "warranty on electronics",
            documents(&[
                "Shipping is free over $50.",
                "Electronics carry a one year warranty.",
                "Gift cards never expire.",
            ]),
            1,
        )
        .unwrap();
    assert_eq!(result[0].content, "Electronics carry a one year warranty.");
    assert_eq!(reranker.scorer_name(), "lexical-overlap");
}
