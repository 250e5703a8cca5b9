// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Offline quality metrics for retrieval and generated answers

pub mod metrics;

pub use metrics::{
    response_quality, retrieval_metrics, semantic_similarity, ResponseQuality, RetrievalMetrics,
};
