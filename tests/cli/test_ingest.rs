// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! `ingest` and `search` commands against the in-process store

use clap::Parser;
use std::io::Write;
use support_rag_node::cli::{ingest, Cli, Commands};
use support_rag_node::embeddings::HashEmbedder;
use support_rag_node::vector::InMemoryVectorStore;
use tempfile::NamedTempFile;

fn write_json(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_ingest_then_search() {
    let file = write_json(
        r#"[
            {"content": "Orders ship within two business days.", "source": "shipping.md"},
            {"content": "Gift cards cannot be refunded."},
            {"content": "Returns are free for members.", "source": "returns.md", "metadata": {"tier": "member"}}
        ]"#,
    );
    let embedder = HashEmbedder::new(64).unwrap();
    let store = InMemoryVectorStore::new("docs", 64);

    let count = ingest::ingest_file(&embedder, &store, file.path()).await.unwrap();
    assert_eq!(count, 3);
    assert_eq!(store.count().await, 3);

    let results = ingest::search(&embedder, &store, "Gift cards cannot be refunded.", 2)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].source, "unknown");
    assert!((results[0].score - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn test_empty_array_ingests_nothing() {
    let file = write_json("[]");
    let embedder = HashEmbedder::new(16).unwrap();
    let store = InMemoryVectorStore::new("docs", 16);

    assert_eq!(ingest::ingest_file(&embedder, &store, file.path()).await.unwrap(), 0);
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn test_malformed_file_is_error() {
    let file = write_json(r#"{"content": "not an array"}"#);
    let embedder = HashEmbedder::new(16).unwrap();
    let store = InMemoryVectorStore::new("docs", 16);

    let err = ingest::ingest_file(&embedder, &store, file.path()).await.unwrap_err();
    assert!(err.to_string().contains("Failed to parse documents"));
}

#[tokio::test]
async fn test_missing_file_is_error() {
    let embedder = HashEmbedder::new(16).unwrap();
    let store = InMemoryVectorStore::new("docs", 16);

    let err = ingest::ingest_file(&embedder, &store, std::path::Path::new("/nonexistent/docs.json"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}

#[test]
fn test_cli_parses_subcommands() {
    let cli = Cli::try_parse_from(["support-rag-cli", "ingest", "--file", "docs.json"]).unwrap();
    assert!(matches!(cli.command, Commands::Ingest(ref args) if args.file.ends_with("docs.json")));

    let cli = Cli::try_parse_from(["support-rag-cli", "search", "--query", "refunds"]).unwrap();
    match cli.command {
        Commands::Search(args) => {
            assert_eq!(args.query, "refunds");
            assert_eq!(args.limit, 5);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}
