// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cross-encoder pair scoring (ms-marco-MiniLM-L-6-v2) through ONNX Runtime
//!
//! The query and candidate are encoded together as one sequence pair; the
//! model emits a single relevance logit per pair.

use super::reranker::PairScorer;
use crate::embeddings::onnx_model::{truncating, BatchInputs};
use anyhow::{anyhow, Context, Result};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tokenizers::{Encoding, Tokenizer, TruncationStrategy};
use tracing::info;

pub const CROSS_ENCODER_MODEL: &str = "cross-encoder/ms-marco-MiniLM-L-6-v2";

/// Longest query + candidate sequence; only the candidate is cut
pub const CROSS_ENCODER_MAX_LENGTH: usize = 512;

pub struct CrossEncoderScorer {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl std::fmt::Debug for CrossEncoderScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoderScorer")
            .field("model", &CROSS_ENCODER_MODEL)
            .finish_non_exhaustive()
    }
}

impl CrossEncoderScorer {
    pub fn new<P: AsRef<Path>>(model_path: P, tokenizer_path: P) -> Result<Self> {
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
            CROSS_ENCODER_MAX_LENGTH,
            TruncationStrategy::OnlySecond,
        )?;

        info!("Initialized reranker model: {}", CROSS_ENCODER_MODEL);

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }
}

/// First logit of each row of a `[batch, n]` or `[batch]` output
fn pair_logits(output: &ndarray::ArrayViewD<'_, f32>, batch: usize) -> Result<Vec<f32>> {
    let logits: Vec<f32> = match output.ndim() {
        1 => output.iter().copied().collect(),
        2 => output.outer_iter().filter_map(|row| row.iter().next().copied()).collect(),
        _ => anyhow::bail!("Model outputs unexpected shape: {:?}", output.shape()),
    };
    if logits.len() != batch {
        anyhow::bail!("Expected {} logits, got {}", batch, logits.len());
    }
    Ok(logits)
}

impl PairScorer for CrossEncoderScorer {
    fn score_pairs(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>> {
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let encodings: Vec<Encoding> = candidates
            .iter()
            .map(|candidate| {
                self.tokenizer
                    .encode((query, *candidate), true)
                    .map_err(|e| anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let inputs = BatchInputs::from_encodings(&encodings)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Reranker session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => Value::from_array(inputs.input_ids)?,
            "attention_mask" => Value::from_array(inputs.attention_mask)?,
            "token_type_ids" => Value::from_array(inputs.token_type_ids)?
        ])?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        pair_logits(&output, candidates.len())
    }

    fn name(&self) -> &str {
        CROSS_ENCODER_MODEL
    }
}
