pub mod cli;
pub mod error;
pub mod models;
pub mod services;

pub use cli::{Cli, Commands};
pub use error::{AppError, CatalogError};
pub use models::{Config, IndexingReport, OutputFormat, ProductRecord, SearchHit};
pub use services::{ProductIndexer, VectorStore, format_product};
