//! Vector store abstraction layer.
//!
//! Backends take plain text and do their own embedding, so callers only
//! deal with `(text, metadata)` pairs and scored hits.

mod pgvector;
mod qdrant;

pub use pgvector::PgVectorBackend;
pub use qdrant::QdrantBackend;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::VectorStoreError;
use crate::models::{Config, Metadata, SearchHit, VectorDriver};
use crate::services::EmbeddingClient;

/// Collection/table information
#[derive(Debug, Clone)]
pub struct CollectionInfo {
    pub points_count: u64,
}

/// Operations every vector store backend provides.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Check if the vector store is healthy and accessible.
    async fn health_check(&self) -> Result<bool, VectorStoreError>;

    /// Get information about the current collection/table.
    /// Returns None if the collection doesn't exist.
    async fn get_collection_info(&self) -> Result<Option<CollectionInfo>, VectorStoreError>;

    /// Create the collection/table if it doesn't exist.
    async fn create_collection(&self) -> Result<(), VectorStoreError>;

    /// Store one text with its metadata.
    async fn add(&self, text: &str, metadata: &Metadata) -> Result<(), VectorStoreError>;

    /// Return up to `limit` matches for `query`, best first.
    async fn search(&self, query: &str, limit: u64) -> Result<Vec<SearchHit>, VectorStoreError>;

    /// Remove every stored entry, keeping an empty collection.
    async fn clear_collection(&self) -> Result<(), VectorStoreError>;

    /// Get the collection/table name.
    fn collection(&self) -> &str;
}

/// Create the backend selected by `vector_store.driver`.
pub async fn create_backend(config: &Config) -> Result<Box<dyn VectorStore>, VectorStoreError> {
    let embedder = EmbeddingClient::new(&config.embedding)?;

    match config.vector_store.driver {
        VectorDriver::Qdrant => {
            let backend = QdrantBackend::new(&config.vector_store, embedder)?;
            Ok(Box::new(backend))
        }
        VectorDriver::PostgreSQL => {
            let backend = PgVectorBackend::new(&config.vector_store, embedder).await?;
            Ok(Box::new(backend))
        }
    }
}

/// Stable id for a stored entry: keyed on `product_id` when present so that
/// re-indexing a product replaces it.
pub(crate) fn point_id(text: &str, metadata: &Metadata) -> Uuid {
    let key = match metadata.get("product_id").and_then(|v| v.as_str()) {
        Some(id) => format!("product:{}", id),
        None => format!("text:{}", text),
    };
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
}
