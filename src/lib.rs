// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod evaluation;
pub mod rag;
pub mod session;
pub mod vector;
pub mod version;

// Re-export main types
pub use api::{create_app, start_server, AppState};
pub use config::Settings;
pub use rag::{RagError, RagPipeline};
pub use session::SessionStore;
