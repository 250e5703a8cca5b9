// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Password login and bearer tokens
//!
//! A single built-in account is served from memory; tokens are HMAC-signed
//! JWTs carrying the username as `sub`.

pub mod tokens;
pub mod users;

pub use tokens::{Claims, TokenService, DEFAULT_TOKEN_EXPIRY_MINUTES};
pub use users::{User, UserStore};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Inactive user")]
    InactiveUser,

    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}
