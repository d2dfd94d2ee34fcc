pub mod agent;
pub mod chat;
mod embedding;
mod formatter;
mod indexer;
pub mod vector_store;

pub use agent::{AgentAnswer, AgentQuery, ProductSearchAgent};
pub use chat::{ChatModel, GeminiChat, OpenAiChat, create_chat_model};
pub use embedding::EmbeddingClient;
pub use formatter::format_product;
pub use indexer::ProductIndexer;
pub use vector_store::{CollectionInfo, VectorStore, create_backend};
