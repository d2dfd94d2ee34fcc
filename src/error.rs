//! Error types for the product catalog toolkit.

use thiserror::Error;

/// Errors related to embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding client not configured: {0}")]
    NotConfigured(String),

    #[error("failed to connect to embedding service: {0}")]
    ConnectionError(String),

    #[error("embedding service error: {0}")]
    ServerError(String),

    #[error("embedding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding timeout")]
    Timeout,
}

/// Errors related to vector store operations.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("failed to connect to vector store: {0}")]
    ConnectionError(String),

    #[error("collection error: {0}")]
    CollectionError(String),

    #[error("upsert error: {0}")]
    UpsertError(String),

    #[error("search error: {0}")]
    SearchError(String),

    #[error("delete error: {0}")]
    DeleteError(String),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("PostgreSQL error: {0}")]
    PostgresError(String),

    #[error("pgvector extension error: {0}")]
    PgVectorExtensionError(String),
}

/// A single product that could not be indexed.
///
/// Never returned from a batch run; the driver logs it and counts it.
#[derive(Debug, Error)]
#[error("failed to index product {sku}: {source}")]
pub struct ItemIndexError {
    pub sku: String,
    #[source]
    pub source: VectorStoreError,
}

/// Errors surfaced by the indexing driver and the search facade.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("not ready: {0}")]
    NotReady(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("vector store unavailable: {0}")]
    Upstream(#[from] VectorStoreError),
}

/// Errors related to chat model calls.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("chat provider error: {0}")]
    ProviderError(String),

    #[error("empty completion from {0}")]
    EmptyCompletion(String),

    #[error("chat timeout")]
    Timeout,
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("path error: {0}")]
    PathError(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Errors related to reading product exports.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error at record {line}: {source}")]
    JsonParseError {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Application-level errors that wrap domain errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("import error: {0}")]
    Import(#[from] ImportError),
}
