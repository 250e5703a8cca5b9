// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::auth::AuthError;
use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// Detail returned for any failure inside the chat pipeline
pub const GENERIC_FAILURE_DETAIL: &str = "Failed to generate a response";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    ValidationError { field: String, message: String },
    Unauthorized(String),
    InactiveUser,
    /// Internal text is logged, never sent to the client
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, detail) = match self {
            ApiError::ValidationError { field, message } => {
                ("validation_error", format!("{}: {}", field, message))
            }
            ApiError::Unauthorized(msg) => ("unauthorized", msg.clone()),
            ApiError::InactiveUser => ("inactive_user", "Inactive user".to_string()),
            ApiError::InternalError(_) => ("internal_error", GENERIC_FAILURE_DETAIL.to_string()),
        };

        ErrorResponse {
            error: error_type.to_string(),
            detail,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError { .. } | ApiError::InactiveUser => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::InactiveUser => write!(f, "Inactive user"),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::InactiveUser => ApiError::InactiveUser,
            AuthError::UnsupportedAlgorithm(_) | AuthError::Signing(_) => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

/// Malformed or incomplete JSON bodies
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::ValidationError {
            field: "body".to_string(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::InternalError(msg) = &self {
            error!("Error processing request: {}", msg);
        }

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.to_response())).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}
