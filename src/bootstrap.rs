// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service construction from [`Settings`]
//!
//! Missing ONNX model files degrade to the hash embedder and lexical
//! reranker with a warning; everything else fails startup.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Settings, VectorStoreBackend};
use crate::embeddings::{Embedder, HashEmbedder, OnnxEmbeddingModel, MINILM_DIMENSION};
use crate::rag::{CompletionClient, CrossEncoderScorer, LexicalScorer, PairScorer, RagPipeline, Reranker};
use crate::vector::{InMemoryVectorStore, QdrantVectorStore, VectorStore};

pub const EMBEDDING_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// `RUST_LOG` directives when set and valid, otherwise `LOG_LEVEL`
pub fn log_filter(rust_log: Option<&str>, log_level: &str) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(log_level.to_lowercase()))
}

/// Install the fmt subscriber for both binaries
pub fn init_tracing(settings: &Settings) {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), &settings.log_level))
        .init();
}

pub async fn build_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    match OnnxEmbeddingModel::new(
        EMBEDDING_MODEL_NAME,
        &settings.embedding_model_path,
        &settings.embedding_tokenizer_path,
    )
    .await
    {
        Ok(model) => Ok(Arc::new(model)),
        Err(e) => {
            warn!(
                "Embedding model unavailable ({}); using feature-hash embeddings",
                e
            );
            Ok(Arc::new(HashEmbedder::new(MINILM_DIMENSION)?))
        }
    }
}

pub fn build_reranker(settings: &Settings) -> Reranker {
    let scorer: Arc<dyn PairScorer> = match CrossEncoderScorer::new(
        &settings.reranker_model_path,
        &settings.reranker_tokenizer_path,
    ) {
        Ok(scorer) => Arc::new(scorer),
        Err(e) => {
            warn!("Reranker model unavailable ({}); using lexical overlap", e);
            Arc::new(LexicalScorer)
        }
    };
    Reranker::new(scorer)
}

/// Connect to the configured store and make sure the collection exists
pub async fn build_vector_store(
    settings: &Settings,
    dimension: usize,
) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match &settings.vector_store {
        VectorStoreBackend::Qdrant { url, api_key } => Arc::new(
            QdrantVectorStore::connect(url, api_key.clone(), &settings.collection_name, dimension)
                .context("Error initializing Qdrant client")?,
        ),
        VectorStoreBackend::Memory => {
            info!("Using in-process vector store");
            Arc::new(InMemoryVectorStore::new(&settings.collection_name, dimension))
        }
    };

    store
        .ensure_collection()
        .await
        .context("Error ensuring collection")?;

    Ok(store)
}

pub async fn build_pipeline(settings: &Settings) -> Result<RagPipeline> {
    let embedder = build_embedder(settings).await?;
    let store = build_vector_store(settings, embedder.dimension()).await?;
    let reranker = build_reranker(settings);
    let completion = CompletionClient::new(
        &settings.llm_api_url,
        &settings.llm_api_key,
        &settings.llm_model,
    )?;

    Ok(RagPipeline::new(embedder, store, reranker, Arc::new(completion))
        .with_limits(settings.retrieval_limit, settings.rerank_top_k))
}
