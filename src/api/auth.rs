// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Token issuance and bearer authentication

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts},
    Form, Json,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::errors::ApiError;
use super::http_server::AppState;
use crate::auth::{AuthError, User};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Active user resolved from the `Authorization: Bearer` header
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::InvalidToken)?;
        let claims = state.tokens.decode(token)?;
        let user = state
            .users
            .get(&claims.sub)
            .ok_or(AuthError::InvalidToken)?;

        if user.disabled {
            return Err(AuthError::InactiveUser.into());
        }

        Ok(CurrentUser(user))
    }
}

/// POST {prefix}/auth/token
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .users
        .authenticate(&form.username, &form.password)
        .ok_or_else(|| {
            warn!("Failed login for {}", form.username);
            AuthError::InvalidCredentials
        })?;

    let expires_in = Duration::from_std(state.settings.access_token_expire)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    let access_token = state
        .tokens
        .create_access_token(&user.username, Some(expires_in))?;

    info!("Issued access token for {}", user.username);

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// GET {prefix}/auth/me
pub async fn me_handler(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
