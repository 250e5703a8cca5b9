// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chat-completion client for an OpenAI-compatible endpoint

use super::errors::{RagError, Result};
use super::types::ChatTurn;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

pub const COMPLETION_TEMPERATURE: f32 = 0.1;
pub const COMPLETION_MAX_TOKENS: u32 = 1024;

// --- OpenAI-compatible serde structs ---

#[derive(Debug, serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    temperature: f32,
    stream: bool,
    max_tokens: u32,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Sends a message sequence to the completion endpoint and returns the
/// first choice's text
pub struct CompletionClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl CompletionClient {
    /// `api_url` is the full completion URL; requests are POSTed to it as-is
    pub fn new(api_url: &str, api_key: &str, model: &str) -> anyhow::Result<Self> {
        url::Url::parse(api_url)
            .map_err(|e| anyhow::anyhow!("Invalid completion API URL {}: {}", api_url, e))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        info!("Initialized RAG pipeline with model: {}", model);

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub async fn complete(&self, messages: &[ChatTurn]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: COMPLETION_TEMPERATURE,
            stream: false,
            max_tokens: COMPLETION_MAX_TOKENS,
        };

        debug!("Sending {} messages to completion API", messages.len());

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Completion(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Completion API returned {}: {}", status, body);
            return Err(RagError::Completion(format!("status {}", status)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| RagError::InvalidCompletion(e.to_string()))?;

        parse_first_choice(chat_response)
    }
}

fn parse_first_choice(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .ok_or_else(|| RagError::InvalidCompletion("response has no choices".to_string()))
}
