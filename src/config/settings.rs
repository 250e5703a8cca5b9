// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Environment-sourced settings
//!
//! Every value is read once at process start. Required values that are
//! missing abort startup with a single error naming all of them.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Value of `QDRANT_URL` that selects the in-process vector store
pub const MEMORY_VECTOR_STORE: &str = "memory";

const REQUIRED: &[&str] = &["SECRET_KEY", "USF_API_URL", "USF_API_KEY", "QDRANT_URL"];

/// Upper bound for token expiry and session timeout (ten years)
pub const MAX_DURATION_MINUTES: u64 = 10 * 365 * 24 * 60;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Where retrieved documents live
#[derive(Debug, Clone, PartialEq)]
pub enum VectorStoreBackend {
    Qdrant { url: String, api_key: Option<String> },
    Memory,
}

#[derive(Clone)]
pub struct Settings {
    pub app_name: String,
    pub project_name: String,
    pub debug: bool,
    pub log_level: String,
    pub api_prefix: String,
    pub listen_addr: String,

    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire: Duration,

    pub llm_api_url: String,
    pub llm_api_key: String,
    pub llm_model: String,

    pub vector_store: VectorStoreBackend,
    pub collection_name: String,

    pub session_timeout: Duration,
    pub max_chat_history: usize,

    pub embedding_model_path: PathBuf,
    pub embedding_tokenizer_path: PathBuf,
    pub reranker_model_path: PathBuf,
    pub reranker_tokenizer_path: PathBuf,
    pub retrieval_limit: usize,
    pub rerank_top_k: usize,
}

// Secrets stay out of logs
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("app_name", &self.app_name)
            .field("debug", &self.debug)
            .field("api_prefix", &self.api_prefix)
            .field("listen_addr", &self.listen_addr)
            .field("algorithm", &self.algorithm)
            .field("llm_api_url", &self.llm_api_url)
            .field("llm_model", &self.llm_model)
            .field("collection_name", &self.collection_name)
            .field("session_timeout", &self.session_timeout)
            .field("max_chat_history", &self.max_chat_history)
            .field("retrieval_limit", &self.retrieval_limit)
            .field("rerank_top_k", &self.rerank_top_k)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings from an explicit key/value map
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| values.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED
            .iter()
            .filter(|key| get(**key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingRequired(missing));
        }

        let string_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let path_or = |key: &str, default: &str| PathBuf::from(string_or(key, default));

        let qdrant_url = get("QDRANT_URL").unwrap_or_default();
        let vector_store = if qdrant_url.eq_ignore_ascii_case(MEMORY_VECTOR_STORE) {
            VectorStoreBackend::Memory
        } else {
            url::Url::parse(&qdrant_url).map_err(|_| ConfigError::Invalid {
                key: "QDRANT_URL".to_string(),
                value: qdrant_url.clone(),
            })?;
            VectorStoreBackend::Qdrant {
                url: qdrant_url,
                api_key: get("QDRANT_API_KEY"),
            }
        };

        let llm_api_url = get("USF_API_URL").unwrap_or_default();
        url::Url::parse(&llm_api_url).map_err(|_| ConfigError::Invalid {
            key: "USF_API_URL".to_string(),
            value: llm_api_url.clone(),
        })?;

        let host = string_or("API_HOST", "0.0.0.0");
        let port: u16 = parse_or(&get, "API_PORT", 8000)?;

        let settings = Self {
            app_name: string_or("APP_NAME", "Customer Support RAG"),
            project_name: string_or("PROJECT_NAME", "Customer Support RAG Chatbot"),
            debug: parse_bool(&get, "DEBUG", false)?,
            log_level: string_or("LOG_LEVEL", "info").to_lowercase(),
            api_prefix: normalize_prefix(&string_or("API_V1_STR", "/api/v1")),
            listen_addr: format!("{}:{}", host, port),

            secret_key: get("SECRET_KEY").unwrap_or_default(),
            algorithm: string_or("ALGORITHM", "HS256"),
            access_token_expire: parse_minutes(&get, "ACCESS_TOKEN_EXPIRE_MINUTES", 30)?,

            llm_api_url,
            llm_api_key: get("USF_API_KEY").unwrap_or_default(),
            llm_model: string_or("USF_MODEL", "usf1-mini"),

            vector_store,
            collection_name: string_or("QDRANT_COLLECTION", "customer_support_docs"),

            session_timeout: parse_minutes(&get, "SESSION_TIMEOUT_MINUTES", 30)?,
            max_chat_history: parse_or(&get, "MAX_CHAT_HISTORY", 10)?,

            embedding_model_path: path_or(
                "EMBEDDING_MODEL_PATH",
                "./models/all-MiniLM-L6-v2-onnx/model.onnx",
            ),
            embedding_tokenizer_path: path_or(
                "EMBEDDING_TOKENIZER_PATH",
                "./models/all-MiniLM-L6-v2-onnx/tokenizer.json",
            ),
            reranker_model_path: path_or(
                "RERANKER_MODEL_PATH",
                "./models/ms-marco-MiniLM-L-6-v2-onnx/model.onnx",
            ),
            reranker_tokenizer_path: path_or(
                "RERANKER_TOKENIZER_PATH",
                "./models/ms-marco-MiniLM-L-6-v2-onnx/tokenizer.json",
            ),
            retrieval_limit: parse_or(&get, "RETRIEVAL_LIMIT", 5)?,
            rerank_top_k: parse_or(&get, "RERANK_TOP_K", 3)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Reject combinations the chat path cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chat_history == 0 {
            return Err(ConfigError::Validation(
                "MAX_CHAT_HISTORY must be greater than 0".to_string(),
            ));
        }
        if self.session_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "SESSION_TIMEOUT_MINUTES must be greater than 0".to_string(),
            ));
        }
        let max = Duration::from_secs(MAX_DURATION_MINUTES * 60);
        if self.session_timeout > max {
            return Err(ConfigError::Validation(format!(
                "SESSION_TIMEOUT_MINUTES must not exceed {}",
                MAX_DURATION_MINUTES
            )));
        }
        if self.access_token_expire > max {
            return Err(ConfigError::Validation(format!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must not exceed {}",
                MAX_DURATION_MINUTES
            )));
        }
        if self.rerank_top_k == 0 {
            return Err(ConfigError::Validation(
                "RERANK_TOP_K must be greater than 0".to_string(),
            ));
        }
        if self.retrieval_limit < self.rerank_top_k {
            return Err(ConfigError::Validation(format!(
                "RETRIEVAL_LIMIT ({}) must be at least RERANK_TOP_K ({})",
                self.retrieval_limit, self.rerank_top_k
            )));
        }
        match self.algorithm.as_str() {
            "HS256" | "HS384" | "HS512" => Ok(()),
            other => Err(ConfigError::Invalid {
                key: "ALGORITHM".to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// OpenAPI document path advertised by the root endpoint
    pub fn openapi_url(&self) -> String {
        format!("{}/openapi.json", self.api_prefix)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

fn parse_minutes<G>(get: &G, key: &str, default: u64) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let minutes: u64 = parse_or(get, key, default)?;
    minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Invalid {
            key: key.to_string(),
            value: minutes.to_string(),
        })
}

fn parse_bool<G>(get: &G, key: &str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key: key.to_string(),
                value: raw,
            }),
        },
        None => Ok(default),
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
