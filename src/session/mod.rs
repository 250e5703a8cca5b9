// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Conversation sessions kept in process memory
//!
//! Nothing here survives a restart.

pub mod store;

pub use store::{Session, SessionError, SessionStore};
