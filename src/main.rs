// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use std::sync::Arc;
use support_rag_node::{bootstrap, config::Settings, version, AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    bootstrap::init_tracing(&settings);

    info!("{}", version::get_version_string());
    info!("Configuration: {:?}", settings);

    let pipeline = bootstrap::build_pipeline(&settings)
        .await
        .context("Failed to initialize RAG pipeline")?;

    let state = AppState::new(settings, pipeline).context("Failed to initialize auth")?;

    if let Err(e) = support_rag_node::start_server(Arc::new(state)).await {
        error!("Server error: {:#}", e);
        return Err(e);
    }

    Ok(())
}
