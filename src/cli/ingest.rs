// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::embeddings::Embedder;
use crate::vector::{DocumentInput, ScoredDocument, VectorStore};

/// Arguments for ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// JSON array of {content, source?, metadata?} objects
    #[arg(long)]
    pub file: PathBuf,
}

/// Arguments for search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    #[arg(long)]
    pub query: String,

    /// Maximum number of documents to print
    #[arg(long, default_value_t = 5)]
    pub limit: usize,
}

pub fn load_documents(path: &Path) -> Result<Vec<DocumentInput>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse documents in {}", path.display()))
}

/// Embed every document in the file and upsert them in one call.
///
/// Point ids restart at zero, so this replaces whatever a previous ingest
/// stored under the same ids.
pub async fn ingest_file(
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    path: &Path,
) -> Result<usize> {
    let documents = load_documents(path)?;
    if documents.is_empty() {
        return Ok(0);
    }

    let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
    let vectors = embedder
        .embed_batch(&texts)
        .await
        .context("Failed to embed documents")?;

    let count = store.upsert(&documents, &vectors).await?;
    info!("Ingested {} documents from {}", count, path.display());
    Ok(count)
}

pub async fn search(
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    query: &str,
    limit: usize,
) -> Result<Vec<ScoredDocument>> {
    let vector = embedder.embed(query).await.context("Failed to embed query")?;
    Ok(store.search(&vector, limit).await?)
}
