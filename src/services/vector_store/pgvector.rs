use async_trait::async_trait;
use pgvector::Vector;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use std::time::Duration;

use super::{CollectionInfo, VectorStore, point_id};
use crate::error::VectorStoreError;
use crate::models::{Metadata, SearchHit, VectorStoreConfig};
use crate::services::EmbeddingClient;

pub struct PgVectorBackend {
    pool: PgPool,
    embedder: EmbeddingClient,
    table_name: String,
    collection: String,
}

impl PgVectorBackend {
    pub async fn new(
        config: &VectorStoreConfig,
        embedder: EmbeddingClient,
    ) -> Result<Self, VectorStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_max)
            .acquire_timeout(Duration::from_secs(config.pool_acquire_timeout.into()))
            .connect(&config.url)
            .await
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

        let backend = Self {
            pool,
            embedder,
            table_name: config.qualified_table_name(),
            collection: config.collection.clone(),
        };

        backend.check_pgvector_extension().await?;

        if let Some(ref schema) = config.schema {
            backend.ensure_schema(schema).await?;
        }

        Ok(backend)
    }

    async fn check_pgvector_extension(&self) -> Result<(), VectorStoreError> {
        let result: Option<(String,)> =
            sqlx::query_as("SELECT extname FROM pg_extension WHERE extname = 'vector'")
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| VectorStoreError::PostgresError(e.to_string()))?;

        if result.is_none() {
            return Err(VectorStoreError::PgVectorExtensionError(
                "pgvector extension is not installed. Run: CREATE EXTENSION vector;".to_string(),
            ));
        }

        Ok(())
    }

    async fn ensure_schema(&self, schema: &str) -> Result<(), VectorStoreError> {
        self.run(
            &format!("CREATE SCHEMA IF NOT EXISTS {}", schema),
            VectorStoreError::PostgresError,
        )
        .await
    }

    /// Execute a statement with no bind parameters.
    async fn run(
        &self,
        sql: &str,
        on_error: fn(String) -> VectorStoreError,
    ) -> Result<(), VectorStoreError> {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| on_error(e.to_string()))
    }
}

#[async_trait]
impl VectorStore for PgVectorBackend {
    async fn health_check(&self) -> Result<bool, VectorStoreError> {
        self.run("SELECT 1", VectorStoreError::ConnectionError)
            .await
            .map(|()| true)
    }

    async fn get_collection_info(&self) -> Result<Option<CollectionInfo>, VectorStoreError> {
        let table_exists: Option<(String,)> = sqlx::query_as(
            "SELECT table_name FROM information_schema.tables WHERE table_name = $1",
        )
        .bind(&self.collection)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| VectorStoreError::PostgresError(e.to_string()))?;

        if table_exists.is_none() {
            return Ok(None);
        }

        let count_sql = format!("SELECT COUNT(*) FROM {}", self.table_name);
        let (count,): (i64,) = sqlx::query_as(&count_sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| VectorStoreError::PostgresError(e.to_string()))?;

        Ok(Some(CollectionInfo {
            points_count: count.max(0) as u64,
        }))
    }

    async fn create_collection(&self) -> Result<(), VectorStoreError> {
        if self.get_collection_info().await?.is_some() {
            return Ok(());
        }

        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                content TEXT NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{{}}',
                embedding vector({}) NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
            self.table_name,
            self.embedder.dimension()
        );

        let statements = [
            create_table,
            format!(
                "CREATE INDEX IF NOT EXISTS {c}_embedding_idx ON {t} USING hnsw (embedding vector_cosine_ops)",
                c = self.collection,
                t = self.table_name
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS {c}_sku_idx ON {t} ((metadata->>'sku'))",
                c = self.collection,
                t = self.table_name
            ),
        ];

        for sql in &statements {
            self.run(sql, VectorStoreError::CollectionError).await?;
        }

        Ok(())
    }

    async fn add(&self, text: &str, metadata: &Metadata) -> Result<(), VectorStoreError> {
        let embedding = Vector::from(self.embedder.embed(text).await?);
        let metadata_json = serde_json::Value::Object(metadata.clone()).to_string();

        let query = format!(
            r#"
            INSERT INTO {} (id, content, metadata, embedding, updated_at)
            VALUES ($1, $2, $3::jsonb, $4, now())
            ON CONFLICT (id) DO UPDATE SET
                content = EXCLUDED.content,
                metadata = EXCLUDED.metadata,
                embedding = EXCLUDED.embedding,
                updated_at = EXCLUDED.updated_at
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .bind(point_id(text, metadata))
            .bind(text)
            .bind(metadata_json)
            .bind(&embedding)
            .execute(&self.pool)
            .await
            .map_err(|e| VectorStoreError::UpsertError(e.to_string()))?;

        Ok(())
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<SearchHit>, VectorStoreError> {
        let embedding = Vector::from(self.embedder.embed(query).await?);

        let sql = format!(
            r#"
            SELECT
                content,
                metadata::text as metadata,
                1 - (embedding <=> $1) as score
            FROM {}
            ORDER BY embedding <=> $1
            LIMIT {}
            "#,
            self.table_name, limit
        );

        let rows = sqlx::query(&sql)
            .bind(&embedding)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| VectorStoreError::SearchError(e.to_string()))?;

        rows.into_iter()
            .map(|row: PgRow| {
                let text: String = row.get("content");
                let metadata_json: String = row.get("metadata");
                let score: f64 = row.get("score");

                let metadata: Metadata = serde_json::from_str(&metadata_json)
                    .map_err(|e| VectorStoreError::SearchError(e.to_string()))?;

                Ok(SearchHit {
                    text,
                    metadata,
                    score: score as f32,
                })
            })
            .collect()
    }

    async fn clear_collection(&self) -> Result<(), VectorStoreError> {
        if self.get_collection_info().await?.is_none() {
            return Ok(());
        }

        self.run(
            &format!("TRUNCATE TABLE {}", self.table_name),
            VectorStoreError::DeleteError,
        )
        .await
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}
