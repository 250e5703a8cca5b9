// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use super::{ChatRequest, ChatResponse};
use crate::api::{ApiError, AppState, CurrentUser};
use crate::rag::ChatTurn;

/// POST {prefix}/chat
///
/// resolve session -> touch -> answer with the history snapshot -> append
/// user and assistant turns -> sweep expired sessions
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let (session_id, created) = state.sessions.resolve(request.session_id.as_deref()).await;
    if created {
        info!("Started session {} for {}", session_id, user.username);
    }

    let internal = |e: &dyn std::fmt::Display| ApiError::InternalError(e.to_string());

    state
        .sessions
        .touch(&session_id)
        .await
        .map_err(|e| internal(&e))?;
    let history = state
        .sessions
        .history(&session_id)
        .await
        .map_err(|e| internal(&e))?;

    let answer = state
        .pipeline
        .answer(&request.message, &history)
        .await
        .map_err(|e| internal(&e))?;

    state
        .sessions
        .append(
            &session_id,
            vec![
                ChatTurn::user(request.message.clone()),
                ChatTurn::assistant(answer.response.clone()),
            ],
        )
        .await
        .map_err(|e| internal(&e))?;

    state.sessions.sweep().await;
    debug!("Answered in session {} with {} sources", session_id, answer.sources.len());

    Ok(Json(ChatResponse {
        response: answer.response,
        session_id,
        sources: answer.sources,
        timestamp: Utc::now(),
    }))
}
