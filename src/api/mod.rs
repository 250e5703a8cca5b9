// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod auth;
pub mod chat;
pub mod errors;
pub mod handlers;
pub mod http_server;

pub use auth::CurrentUser;
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState};
