//! Qdrant vector store backend implementation.

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    Value, VectorParamsBuilder,
};
use std::collections::HashMap;

use super::{CollectionInfo, VectorStore, point_id};
use crate::error::VectorStoreError;
use crate::models::{Metadata, SearchHit, VectorStoreConfig};
use crate::services::EmbeddingClient;

const TEXT_FIELD: &str = "text";

/// Qdrant vector store backend.
pub struct QdrantBackend {
    client: Qdrant,
    embedder: EmbeddingClient,
    collection: String,
}

impl QdrantBackend {
    pub fn new(
        config: &VectorStoreConfig,
        embedder: EmbeddingClient,
    ) -> Result<Self, VectorStoreError> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(ref api_key) = config.api_key {
            builder = builder.api_key(api_key.clone());
        }

        let client = builder
            .build()
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            embedder,
            collection: config.collection.clone(),
        })
    }
}

#[async_trait]
impl VectorStore for QdrantBackend {
    async fn health_check(&self) -> Result<bool, VectorStoreError> {
        self.client
            .health_check()
            .await
            .map(|_| true)
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))
    }

    async fn get_collection_info(&self) -> Result<Option<CollectionInfo>, VectorStoreError> {
        match self.client.collection_info(&self.collection).await {
            Ok(info) => Ok(Some(CollectionInfo {
                points_count: info.result.map_or(0, |r| r.points_count.unwrap_or(0)),
            })),
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("not found") || msg.contains("doesn't exist") {
                    Ok(None)
                } else {
                    Err(VectorStoreError::CollectionError(msg))
                }
            }
        }
    }

    async fn create_collection(&self) -> Result<(), VectorStoreError> {
        if self.get_collection_info().await?.is_some() {
            return Ok(());
        }

        let create_collection = CreateCollectionBuilder::new(&self.collection).vectors_config(
            VectorParamsBuilder::new(u64::from(self.embedder.dimension()), Distance::Cosine),
        );

        self.client
            .create_collection(create_collection)
            .await
            .map_err(|e| VectorStoreError::CollectionError(e.to_string()))?;

        Ok(())
    }

    async fn add(&self, text: &str, metadata: &Metadata) -> Result<(), VectorStoreError> {
        let vector = self.embedder.embed(text).await?;

        let mut payload: HashMap<String, Value> = metadata
            .iter()
            .map(|(k, v)| (k.clone(), to_qdrant_value(v)))
            .collect();
        payload.insert(TEXT_FIELD.to_string(), text.to_string().into());

        let point = PointStruct::new(point_id(text, metadata).to_string(), vector, payload);
        let upsert = UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true);

        self.client
            .upsert_points(upsert)
            .await
            .map_err(|e| VectorStoreError::UpsertError(e.to_string()))?;

        Ok(())
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<SearchHit>, VectorStoreError> {
        let query_vector = self.embedder.embed(query).await?;

        let search_builder =
            SearchPointsBuilder::new(&self.collection, query_vector, limit).with_payload(true);

        let results = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| VectorStoreError::SearchError(e.to_string()))?;

        let hits = results
            .result
            .into_iter()
            .map(|point| {
                let mut payload = point.payload;

                let text = payload
                    .remove(TEXT_FIELD)
                    .and_then(|v| match v.kind {
                        Some(Kind::StringValue(s)) => Some(s),
                        _ => None,
                    })
                    .unwrap_or_default();

                let metadata: Metadata = payload
                    .iter()
                    .map(|(k, v)| (k.clone(), from_qdrant_value(v)))
                    .collect();

                SearchHit {
                    text,
                    metadata,
                    score: point.score,
                }
            })
            .collect();

        Ok(hits)
    }

    async fn clear_collection(&self) -> Result<(), VectorStoreError> {
        if self.get_collection_info().await?.is_none() {
            return Ok(());
        }

        self.client
            .delete_collection(&self.collection)
            .await
            .map_err(|e| VectorStoreError::DeleteError(e.to_string()))?;

        self.create_collection().await?;

        Ok(())
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}

fn to_qdrant_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value {
            kind: Some(Kind::NullValue(0)),
        },
        serde_json::Value::Bool(b) => (*b).into(),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => i.into(),
            None => n.as_f64().unwrap_or_default().into(),
        },
        serde_json::Value::String(s) => s.clone().into(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(to_qdrant_value)
            .collect::<Vec<Value>>()
            .into(),
        // metadata is flat; nested objects are kept as their JSON text
        serde_json::Value::Object(_) => value.to_string().into(),
    }
}

fn from_qdrant_value(value: &Value) -> serde_json::Value {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(*b),
        Some(Kind::IntegerValue(n)) => serde_json::Value::from(*n),
        Some(Kind::DoubleValue(x)) => serde_json::Number::from_f64(*x)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s.clone()),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.iter().map(from_qdrant_value).collect())
        }
        Some(Kind::StructValue(s)) => serde_json::Value::Object(
            s.fields
                .iter()
                .map(|(k, v)| (k.clone(), from_qdrant_value(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_keep_integer_kind() {
        assert_eq!(
            to_qdrant_value(&json!(120)).kind,
            Some(Kind::IntegerValue(120))
        );
        assert_eq!(
            to_qdrant_value(&json!(24.5)).kind,
            Some(Kind::DoubleValue(24.5))
        );
    }

    #[test]
    fn test_missing_price_reads_back_as_null() {
        let value = to_qdrant_value(&json!(null));
        assert_eq!(from_qdrant_value(&value), json!(null));
        assert_eq!(from_qdrant_value(&Value { kind: None }), json!(null));
    }

    #[test]
    fn test_nested_object_is_flattened_to_text() {
        let value = json!({"a": 1});
        assert_eq!(
            from_qdrant_value(&to_qdrant_value(&value)),
            json!("{\"a\":1}")
        );
    }
}
