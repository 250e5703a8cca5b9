// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! Runs the all-MiniLM-L6-v2 sentence transformer through ONNX Runtime.
//!
//! Features:
//! - ONNX model loading from disk
//! - BERT tokenization
//! - Single and batch embedding generation
//! - Mean pooling over token embeddings, weighted by the attention mask
//! - L2-normalised 384-dimensional output vectors

use super::{l2_normalize, Embedder, MINILM_DIMENSION};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, ArrayViewD, Axis};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Encoding, Tokenizer, TruncationParams, TruncationStrategy};
use tracing::info;

/// Longest token sequence fed to the sentence embedder
pub const EMBEDDING_MAX_LENGTH: usize = 256;

/// ONNX-based embedding model (all-MiniLM-L6-v2)
///
/// # Model Details
/// - Input: Text strings (up to 256 tokens)
/// - Output: 384-dimensional f32 vectors
/// - Provider: CPU (ONNX Runtime)
///
/// # Thread Safety
/// All fields are wrapped in Arc for cheap cloning and thread-safe sharing.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    /// ONNX Runtime session (wrapped in Arc<Mutex> for thread-safe shared access)
    session: Arc<Mutex<Session>>,

    tokenizer: Arc<Tokenizer>,

    model_name: String,

    dimension: usize,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

/// Padded model inputs for a batch of encodings
pub(crate) struct BatchInputs {
    pub(crate) input_ids: Array2<i64>,
    pub(crate) attention_mask: Array2<i64>,
    pub(crate) token_type_ids: Array2<i64>,
    /// Flattened copy of the attention mask, `batch * max_len` long
    pub(crate) mask: Vec<i64>,
    pub(crate) max_len: usize,
}

impl BatchInputs {
    pub(crate) fn from_encodings(encodings: &[Encoding]) -> Result<Self> {
        let max_len = encodings
            .iter()
            .map(|enc| enc.get_ids().len())
            .max()
            .unwrap_or(0);
        let batch = encodings.len();

        let mut input_ids = Vec::with_capacity(batch * max_len);
        let mut attention_mask = Vec::with_capacity(batch * max_len);
        let mut token_type_ids = Vec::with_capacity(batch * max_len);

        for encoding in encodings {
            let ids = encoding.get_ids();
            let padding = max_len - ids.len();

            input_ids.extend(ids.iter().map(|&id| id as i64));
            attention_mask.extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
            token_type_ids.extend(encoding.get_type_ids().iter().map(|&t| t as i64));

            input_ids.extend(std::iter::repeat(0i64).take(padding));
            attention_mask.extend(std::iter::repeat(0i64).take(padding));
            token_type_ids.extend(std::iter::repeat(0i64).take(padding));
        }

        let mask = attention_mask.clone();

        Ok(Self {
            input_ids: Array2::from_shape_vec((batch, max_len), input_ids)
                .context("Failed to create input_ids array")?,
            attention_mask: Array2::from_shape_vec((batch, max_len), attention_mask)
                .context("Failed to create attention_mask array")?,
            token_type_ids: Array2::from_shape_vec((batch, max_len), token_type_ids)
                .context("Failed to create token_type_ids array")?,
            mask,
            max_len,
        })
    }
}

/// Cap every encoding produced by `tokenizer` at `max_length` tokens,
/// special tokens included
pub(crate) fn truncating(
    mut tokenizer: Tokenizer,
    max_length: usize,
    strategy: TruncationStrategy,
) -> Result<Tokenizer> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            strategy,
            ..Default::default()
        }))
        .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
    Ok(tokenizer)
}

/// Average token embeddings `[seq_len, hidden]`, ignoring padded positions
fn mean_pool(token_embeddings: &ArrayViewD<'_, f32>, mask: &[i64]) -> Vec<f32> {
    let seq_len = token_embeddings.shape()[0];
    let hidden_dim = token_embeddings.shape()[1];

    let mut pooled = vec![0.0f32; hidden_dim];
    let mut sum_mask = 0.0f32;

    for i in 0..seq_len {
        let mask_value = mask.get(i).copied().unwrap_or(0) as f32;
        sum_mask += mask_value;
        for (j, slot) in pooled.iter_mut().enumerate() {
            *slot += token_embeddings[[i, j]] * mask_value;
        }
    }

    for val in &mut pooled {
        *val /= sum_mask.max(1e-9);
    }

    pooled
}

impl OnnxEmbeddingModel {
    /// Creates a new ONNX embedding model from disk paths
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found or invalid
    /// - Tokenizer file not found or invalid
    /// - ONNX Runtime initialization fails
    /// - Model doesn't output 384 dimensions
    ///
    /// # Example
    /// ```ignore
    /// let model = OnnxEmbeddingModel::new(
    ///     "all-MiniLM-L6-v2",
    ///     "./models/all-MiniLM-L6-v2-onnx/model.onnx",
    ///     "./models/all-MiniLM-L6-v2-onnx/tokenizer.json"
    /// ).await?;
    /// ```
    pub async fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load ONNX model from {}",
                model_path.display()
            ))?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        let tokenizer = truncating(
            tokenizer,
            EMBEDDING_MAX_LENGTH,
            TruncationStrategy::LongestFirst,
        )?;

        let model = Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension: MINILM_DIMENSION,
        };

        // Validation inference: catches models with a different hidden size
        let sample = model.run(&["validation test".to_string()])?;
        if sample.first().map(Vec::len) != Some(MINILM_DIMENSION) {
            anyhow::bail!(
                "Model outputs unexpected dimensions (expected [batch, seq_len, {}])",
                MINILM_DIMENSION
            );
        }

        info!(
            "Initialized embedding model: {} ({} dimensions)",
            model.model_name, model.dimension
        );

        Ok(model)
    }

    /// Tokenize, run inference, pool and normalise
    fn run(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings: Vec<Encoding> = texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(text.as_str(), true)
                    .map_err(|e| anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let inputs = BatchInputs::from_encodings(&encodings)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Embedding session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => Value::from_array(inputs.input_ids)?,
            "attention_mask" => Value::from_array(inputs.attention_mask)?,
            "token_type_ids" => Value::from_array(inputs.token_type_ids)?
        ])?;

        // Index [0]: output names differ between exports of the same model
        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        // Token-level embeddings: [batch, seq_len, hidden_dim]
        if output.shape().len() != 3 {
            anyhow::bail!("Model outputs unexpected shape: {:?}", output.shape());
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch_idx in 0..texts.len() {
            let item = output.index_axis(Axis(0), batch_idx);
            let start = batch_idx * inputs.max_len;
            let mask = &inputs.mask[start..start + inputs.max_len];

            let mut pooled = mean_pool(&item, mask);
            l2_normalize(&mut pooled);
            embeddings.push(pooled);
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl Embedder for OnnxEmbeddingModel {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.run(&[text.to_string()])?;
        let embedding = embeddings
            .pop()
            .ok_or_else(|| anyhow!("Model returned no embedding"))?;

        if embedding.len() != self.dimension {
            anyhow::bail!(
                "Unexpected embedding dimension: {} (expected {})",
                embedding.len(),
                self.dimension
            );
        }

        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let embeddings = self.run(texts)?;

        for (i, emb) in embeddings.iter().enumerate() {
            if emb.len() != self.dimension {
                anyhow::bail!(
                    "Unexpected embedding dimension at index {}: {} (expected {})",
                    i,
                    emb.len(),
                    self.dimension
                );
            }
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
