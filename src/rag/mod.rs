// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// RAG (Retrieval-Augmented Generation) module
// Retrieval, reranking and answer generation for support chat

pub mod completion;
pub mod cross_encoder;
pub mod errors;
pub mod pipeline;
pub mod reranker;
pub mod types;

pub use completion::CompletionClient;
pub use cross_encoder::CrossEncoderScorer;
pub use errors::RagError;
pub use pipeline::{RagAnswer, RagPipeline};
pub use reranker::{LexicalScorer, PairScorer, Reranker};
pub use types::{ChatTurn, Document, DocumentMetadata, Role};
