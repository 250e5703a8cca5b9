// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response body for POST {prefix}/chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's response
    pub response: String,

    /// Session to send back on the next message
    pub session_id: String,

    /// Source labels of the documents used as context, best first
    pub sources: Vec<String>,

    pub timestamp: DateTime<Utc>,
}
