use anyhow::Result;
use tracing::debug;

use crate::cli::output::{StatusInfo, get_formatter};
use crate::models::{ChatProvider, Config, OutputFormat, VectorDriver};
use crate::services::{create_backend, create_chat_model};

pub async fn handle_status(config: &Config, format: OutputFormat, _verbose: bool) -> Result<()> {
    let formatter = get_formatter(format);

    let (vector_store_connected, vector_store_points) = match create_backend(config).await {
        Ok(store) => {
            let connected = store.health_check().await.unwrap_or(false);
            let points = if connected {
                store
                    .get_collection_info()
                    .await
                    .ok()
                    .flatten()
                    .map_or(0, |info| info.points_count)
            } else {
                0
            };
            (connected, points)
        }
        Err(e) => {
            debug!(error = %e, "vector store unavailable");
            (false, 0)
        }
    };

    let chat_model = match config.chat.provider {
        ChatProvider::OpenAi => config.chat.openai_model.clone(),
        ChatProvider::Gemini => config.chat.gemini_model.clone(),
    };

    let status = StatusInfo {
        vector_store_driver: config.vector_store.driver.to_string(),
        vector_store_url: config.vector_store.url.clone(),
        vector_store_connected,
        vector_store_points,
        collection: config.vector_store.collection.clone(),
        embedding_model: config.embedding.model.clone(),
        chat_provider: config.chat.provider.to_string(),
        chat_model,
        chat_ready: create_chat_model(&config.chat).is_ok(),
    };

    print!("{}", formatter.format_status(&status));

    if !vector_store_connected {
        eprintln!();
        if config.embedding.api_key.is_none() {
            eprintln!("Warning: OPENAI_API_KEY is not set; embeddings are unavailable.");
        }
        match config.vector_store.driver {
            VectorDriver::Qdrant => {
                eprintln!("Warning: Qdrant not reachable. Start with: docker compose up -d qdrant");
            }
            VectorDriver::PostgreSQL => {
                eprintln!("Warning: PostgreSQL not accessible. Check connection settings.");
            }
        }
    }

    Ok(())
}
