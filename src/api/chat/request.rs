// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::ApiError;
use serde::{Deserialize, Serialize};

/// Request body for POST {prefix}/chat
///
/// # Example
/// ```json
/// {
///   "message": "What is your return policy?",
///   "session_id": "3f2b6c1e-..."
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,

    /// Session to continue; unknown or absent ids start a new session
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.message.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "message".to_string(),
                message: "message must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
