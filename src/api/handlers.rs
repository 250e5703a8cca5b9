// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::http_server::AppState;
use crate::version;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RootResponse {
    pub message: String,
    pub docs_url: String,
    pub openapi_url: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions: usize,
}

pub async fn root_handler(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("Welcome to the {} API", state.settings.project_name),
        docs_url: "/docs".to_string(),
        openapi_url: state.settings.openapi_url(),
    })
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: version::VERSION_NUMBER.to_string(),
        sessions: state.sessions.len().await,
    })
}
