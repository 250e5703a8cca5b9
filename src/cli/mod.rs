// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod ingest;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::bootstrap;
use crate::config::Settings;

/// Support RAG operator CLI
#[derive(Parser, Debug)]
#[command(name = "support-rag-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Load and inspect the support document collection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Embed documents from a JSON file and store them
    Ingest(ingest::IngestArgs),

    /// Print the documents nearest to a query
    Search(ingest::SearchArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli, settings: &Settings) -> Result<()> {
    let embedder = bootstrap::build_embedder(settings).await?;
    let store = bootstrap::build_vector_store(settings, embedder.dimension()).await?;

    match cli.command {
        Commands::Ingest(args) => {
            let count = ingest::ingest_file(embedder.as_ref(), store.as_ref(), &args.file).await?;
            println!("Ingested {} documents into {}", count, store.collection_name());
        }
        Commands::Search(args) => {
            let results =
                ingest::search(embedder.as_ref(), store.as_ref(), &args.query, args.limit).await?;
            if results.is_empty() {
                println!("No documents found");
            }
            for (rank, doc) in results.iter().enumerate() {
                println!("{}. [{:.4}] {}: {}", rank + 1, doc.score, doc.source, doc.content);
            }
        }
    }

    Ok(())
}
