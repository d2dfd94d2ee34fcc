mod config;
mod product;
mod report;
mod search;

pub use config::{
    ChatConfig, ChatProvider, Config, DEFAULT_BATCH_SIZE, DEFAULT_COLLECTION,
    DEFAULT_EMBEDDING_DIMENSION, DEFAULT_EMBEDDING_MODEL, DEFAULT_GEMINI_MODEL,
    DEFAULT_MIN_SCORE, DEFAULT_OPENAI_MODEL, DEFAULT_QDRANT_URL, DEFAULT_SEARCH_LIMIT,
    EmbeddingConfig, IndexingConfig, SearchConfig, VectorDriver, VectorStoreConfig,
};
pub use product::{DocumentMetadata, IndexedDocument, Metadata, ProductRecord, SpecValue};
pub use report::{IndexingFailure, IndexingReport, MAX_FAILURE_SAMPLES};
pub use search::{OutputFormat, SearchHit, SearchRequest, SearchResults};
