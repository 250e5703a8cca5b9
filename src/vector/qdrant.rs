// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Qdrant-backed vector store
//!
//! Payload layout per point: `content` (string), `source` (string) and
//! `metadata` (arbitrary JSON object).

use super::{validate_upsert, validate_vector, DocumentInput, ScoredDocument, VectorStore, VectorStoreError};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    value::Kind, CreateCollectionBuilder, Distance, ListValue, PointStruct, SearchPointsBuilder,
    Struct, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{error, info};

pub struct QdrantVectorStore {
    client: Qdrant,
    collection_name: String,
    dimension: usize,
}

impl std::fmt::Debug for QdrantVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantVectorStore")
            .field("collection_name", &self.collection_name)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

fn backend_error(context: &str, err: impl std::fmt::Display) -> VectorStoreError {
    error!("{}: {}", context, err);
    VectorStoreError::Backend(format!("{}: {}", context, err))
}

impl QdrantVectorStore {
    /// Connect to a Qdrant server. Does not touch the collection; call
    /// [`VectorStore::ensure_collection`] before first use.
    pub fn connect(
        url: &str,
        api_key: Option<String>,
        collection_name: impl Into<String>,
        dimension: usize,
    ) -> Result<Self, VectorStoreError> {
        let client = Qdrant::from_url(url)
            .api_key(api_key)
            .build()
            .map_err(|e| backend_error("Failed to create Qdrant client", e))?;

        let collection_name = collection_name.into();
        info!("Initialized Qdrant client for collection {}", collection_name);

        Ok(Self {
            client,
            collection_name,
            dimension,
        })
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn ensure_collection(&self) -> Result<(), VectorStoreError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| backend_error("Failed to list collections", e))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection_name);

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(self.collection_name.clone()).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| backend_error("Failed to create collection", e))?;
            info!("Created collection: {}", self.collection_name);
        }

        Ok(())
    }

    async fn upsert(
        &self,
        documents: &[DocumentInput],
        vectors: &[Vec<f32>],
    ) -> Result<usize, VectorStoreError> {
        validate_upsert(documents, vectors, self.dimension)?;
        if documents.is_empty() {
            return Ok(0);
        }

        let points: Vec<PointStruct> = documents
            .iter()
            .zip(vectors.iter())
            .enumerate()
            .map(|(id, (document, vector))| {
                PointStruct::new(id as u64, vector.clone(), document_payload(document))
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(self.collection_name.clone(), points).wait(true))
            .await
            .map_err(|e| backend_error("Failed to upsert points", e))?;

        info!("Added {} documents to collection", documents.len());
        Ok(documents.len())
    }

    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredDocument>, VectorStoreError> {
        validate_vector(vector, self.dimension)?;

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(self.collection_name.clone(), vector.to_vec(), limit as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| backend_error("Failed to search points", e))?;

        Ok(response
            .result
            .into_iter()
            .map(|point| {
                let mut payload = point.payload;
                let content = payload
                    .remove("content")
                    .and_then(|v| qdrant_value_to_string(&v))
                    .unwrap_or_default();
                let source = payload
                    .remove("source")
                    .and_then(|v| qdrant_value_to_string(&v))
                    .unwrap_or_else(|| super::types::UNKNOWN_SOURCE.to_string());
                let metadata = payload
                    .remove("metadata")
                    .map(|v| qdrant_to_json_value(&v))
                    .unwrap_or_else(|| JsonValue::Object(Default::default()));

                ScoredDocument {
                    content,
                    source,
                    score: point.score,
                    metadata,
                }
            })
            .collect())
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }
}

fn document_payload(document: &DocumentInput) -> HashMap<String, QdrantValue> {
    let mut payload = HashMap::new();
    payload.insert("content".to_string(), QdrantValue::from(document.content.clone()));
    payload.insert("source".to_string(), QdrantValue::from(document.source.clone()));
    payload.insert("metadata".to_string(), json_to_qdrant_value(&document.metadata));
    payload
}

fn json_to_qdrant_value(json: &JsonValue) -> QdrantValue {
    let kind = match json {
        JsonValue::Null => Kind::NullValue(0),
        JsonValue::Bool(b) => Kind::BoolValue(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Kind::IntegerValue(i),
            None => Kind::DoubleValue(n.as_f64().unwrap_or_default()),
        },
        JsonValue::String(s) => Kind::StringValue(s.clone()),
        JsonValue::Array(items) => Kind::ListValue(ListValue {
            values: items.iter().map(json_to_qdrant_value).collect(),
        }),
        JsonValue::Object(map) => Kind::StructValue(Struct {
            fields: map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_qdrant_value(v)))
                .collect(),
        }),
    };
    QdrantValue { kind: Some(kind) }
}

fn qdrant_to_json_value(value: &QdrantValue) -> JsonValue {
    match &value.kind {
        Some(Kind::StringValue(s)) => JsonValue::String(s.clone()),
        Some(Kind::IntegerValue(i)) => JsonValue::Number((*i).into()),
        Some(Kind::DoubleValue(f)) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Some(Kind::BoolValue(b)) => JsonValue::Bool(*b),
        Some(Kind::ListValue(list)) => {
            JsonValue::Array(list.values.iter().map(qdrant_to_json_value).collect())
        }
        Some(Kind::StructValue(s)) => JsonValue::Object(
            s.fields
                .iter()
                .map(|(k, v)| (k.clone(), qdrant_to_json_value(v)))
                .collect(),
        ),
        Some(Kind::NullValue(_)) | None => JsonValue::Null,
    }
}

fn qdrant_value_to_string(value: &QdrantValue) -> Option<String> {
    match &value.kind {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}
