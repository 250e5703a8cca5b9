// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::AuthError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, error};

/// Lifetime of a token created without an explicit expiry
pub const DEFAULT_TOKEN_EXPIRY_MINUTES: i64 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Expiry as seconds since the Unix epoch
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Only the HMAC family (HS256, HS384, HS512) is accepted
    pub fn new(secret: &str, algorithm: &str) -> Result<Self, AuthError> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| AuthError::UnsupportedAlgorithm(algorithm.to_string()))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(AuthError::UnsupportedAlgorithm(format!("{:?}", algorithm)));
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn create_access_token(
        &self,
        subject: &str,
        expires_in: Option<Duration>,
    ) -> Result<String, AuthError> {
        let expires_in =
            expires_in.unwrap_or_else(|| Duration::minutes(DEFAULT_TOKEN_EXPIRY_MINUTES));
        let expires_at = Utc::now().checked_add_signed(expires_in).ok_or_else(|| {
            error!("Token expiry out of range: {}", expires_in);
            AuthError::Signing("token expiry out of range".to_string())
        })?;
        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(|e| {
            error!("Failed to sign token: {}", e);
            AuthError::Signing(e.to_string())
        })
    }

    /// Verify signature and expiry
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })
    }
}
