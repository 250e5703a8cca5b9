// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use tracing::debug;

pub const TEST_USERNAME: &str = "test@example.com";
pub const TEST_PASSWORD: &str = "testpassword123";

const PBKDF2_ROUNDS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Salt hashed against when the username is unknown, so both paths cost
/// one PBKDF2 run
const DUMMY_SALT: [u8; SALT_LEN] = [0x5a; SALT_LEN];

/// Public profile returned by `/auth/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub disabled: bool,
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    salt: [u8; SALT_LEN],
    /// hex-encoded PBKDF2-HMAC-SHA256 of the password
    password_hash: String,
}

fn hash_password(password: &str, salt: &[u8]) -> String {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut out);
    hex::encode(out)
}

fn verify_password(password: &str, salt: &[u8], expected_hash: &str) -> bool {
    let candidate = hash_password(password, salt);
    candidate.as_bytes().ct_eq(expected_hash.as_bytes()).into()
}

/// In-memory account registry
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: HashMap<String, StoredUser>,
}

impl UserStore {
    /// Store holding only the built-in test account
    pub fn with_test_user() -> Self {
        let mut store = Self::default();
        store.insert(
            User {
                username: TEST_USERNAME.to_string(),
                email: Some(TEST_USERNAME.to_string()),
                full_name: Some("Test User".to_string()),
                disabled: false,
            },
            TEST_PASSWORD,
        );
        store
    }

    /// Add or replace an account; the password is hashed with a fresh salt
    pub fn insert(&mut self, user: User, password: &str) {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let password_hash = hash_password(password, &salt);
        self.users.insert(
            user.username.clone(),
            StoredUser {
                user,
                salt,
                password_hash,
            },
        );
    }

    pub fn get(&self, username: &str) -> Option<User> {
        self.users.get(username).map(|stored| stored.user.clone())
    }

    /// The user if the password matches, otherwise `None`
    pub fn authenticate(&self, username: &str, password: &str) -> Option<User> {
        let Some(stored) = self.users.get(username) else {
            hash_password(password, &DUMMY_SALT);
            debug!("Unknown user {}", username);
            return None;
        };
        if verify_password(password, &stored.salt, &stored.password_hash) {
            Some(stored.user.clone())
        } else {
            debug!("Password mismatch for {}", username);
            None
        }
    }
}
