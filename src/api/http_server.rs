// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{auth, chat, handlers};
use crate::auth::{AuthError, TokenService, UserStore};
use crate::config::Settings;
use crate::rag::RagPipeline;
use crate::session::SessionStore;

/// Services shared by every request handler, built once at startup
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    pub sessions: SessionStore,
    pub pipeline: RagPipeline,
    pub users: UserStore,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(settings: Settings, pipeline: RagPipeline) -> Result<Self, AuthError> {
        let tokens = TokenService::new(&settings.secret_key, &settings.algorithm)?;
        let sessions = SessionStore::new(settings.session_timeout, settings.max_chat_history);

        Ok(Self {
            settings,
            sessions,
            pipeline,
            users: UserStore::with_test_user(),
            tokens,
        })
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    let prefix = state.settings.api_prefix.clone();

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route(&format!("{}/auth/token", prefix), post(auth::login_handler))
        .route(&format!("{}/auth/me", prefix), get(auth::me_handler))
        .route(&format!("{}/chat", prefix), post(chat::chat_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr: SocketAddr = state.settings.listen_addr.parse()?;
    info!(
        "Starting {} in {} mode",
        state.settings.app_name,
        if state.settings.debug { "debug" } else { "production" }
    );

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
