//! Batch indexing of product records and filtered catalogue search.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{CatalogError, ItemIndexError, VectorStoreError};
use crate::models::{
    Config, IndexingFailure, IndexingReport, MAX_FAILURE_SAMPLES, ProductRecord, SearchHit,
    SearchRequest,
};
use crate::services::formatter::format_product;
use crate::services::vector_store::{VectorStore, create_backend};

/// Indexes products into a vector store and searches them.
///
/// Built unconfigured with [`ProductIndexer::new`]; every operation fails
/// with [`CatalogError::NotReady`] until a store is attached.
#[derive(Default)]
pub struct ProductIndexer {
    store: Option<Arc<dyn VectorStore>>,
    item_timeout: Option<Duration>,
}

impl ProductIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the store used by all later calls.
    pub fn configure(&mut self, store: Arc<dyn VectorStore>) {
        self.store = Some(store);
    }

    pub fn with_store(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store: Some(store),
            item_timeout: None,
        }
    }

    /// Bound each store write; a write that overruns counts as an error for
    /// that product only.
    pub fn with_item_timeout(mut self, timeout: Duration) -> Self {
        self.item_timeout = Some(timeout);
        self
    }

    /// Build the configured backend, make sure its collection exists and
    /// return a ready indexer.
    pub async fn from_config(config: &Config) -> Result<Self, VectorStoreError> {
        let store = create_backend(config).await?;
        store.create_collection().await?;
        Ok(Self::with_store(Arc::from(store))
            .with_timeout_secs(config.indexing.item_timeout_secs))
    }

    /// Apply an optional per-write bound in seconds; `None` leaves writes
    /// unbounded.
    pub fn with_timeout_secs(self, secs: Option<u64>) -> Self {
        match secs {
            Some(secs) => self.with_item_timeout(Duration::from_secs(secs)),
            None => self,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> Result<&Arc<dyn VectorStore>, CatalogError> {
        self.store.as_ref().ok_or_else(|| {
            CatalogError::NotReady("indexer has no vector store configured".to_string())
        })
    }

    /// Index every product, `batch_size` at a time.
    ///
    /// Per-product failures are counted in the report and never abort the run.
    pub async fn index_products(
        &self,
        products: &[ProductRecord],
        batch_size: usize,
    ) -> Result<IndexingReport, CatalogError> {
        self.index_products_with_progress(products, batch_size, |_| {})
            .await
    }

    /// Same as [`index_products`](Self::index_products), calling `on_batch`
    /// with the size of each batch once it has been processed.
    pub async fn index_products_with_progress<F>(
        &self,
        products: &[ProductRecord],
        batch_size: usize,
        mut on_batch: F,
    ) -> Result<IndexingReport, CatalogError>
    where
        F: FnMut(usize),
    {
        let store = self.store()?;
        if batch_size == 0 {
            return Err(CatalogError::InvalidArgument(
                "batch_size must be at least 1".to_string(),
            ));
        }

        let started_at = chrono::Utc::now().to_rfc3339();
        let start = Instant::now();
        let mut indexed = 0u64;
        let mut errors = 0u64;
        let mut failures = Vec::new();

        info!(
            products = products.len(),
            batch_size,
            collection = store.collection(),
            "indexing started"
        );

        for (batch_no, batch) in products.chunks(batch_size).enumerate() {
            debug!(batch = batch_no + 1, size = batch.len(), "processing batch");

            for product in batch {
                match self.index_one(store.as_ref(), product).await {
                    Ok(()) => indexed += 1,
                    Err(e) => {
                        errors += 1;
                        warn!(sku = %e.sku, error = %e.source, "failed to index product");
                        if failures.len() < MAX_FAILURE_SAMPLES {
                            failures.push(IndexingFailure {
                                sku: e.sku,
                                reason: e.source.to_string(),
                            });
                        }
                    }
                }
            }

            on_batch(batch.len());
        }

        let report = IndexingReport::new(
            indexed,
            errors,
            products.len() as u64,
            start.elapsed(),
            started_at,
            failures,
        );

        info!(
            indexed = report.indexed,
            errors = report.errors,
            total = report.total,
            duration_seconds = report.duration_seconds,
            products_per_second = report.products_per_second,
            "indexing finished"
        );

        Ok(report)
    }

    async fn index_one(
        &self,
        store: &dyn VectorStore,
        product: &ProductRecord,
    ) -> Result<(), ItemIndexError> {
        let document = format_product(product);
        let metadata = document.metadata.to_map();
        let write = store.add(&document.text, &metadata);

        let result = match self.item_timeout {
            Some(limit) => tokio::time::timeout(limit, write).await.unwrap_or_else(|_| {
                Err(VectorStoreError::UpsertError(format!(
                    "timed out after {}ms",
                    limit.as_millis()
                )))
            }),
            None => write.await,
        };

        result.map_err(|source| ItemIndexError {
            sku: product.sku.clone(),
            source,
        })
    }

    /// Search the catalogue, keeping at most `limit` hits scoring at least
    /// `min_score`, in the order the store ranked them.
    pub async fn search(
        &self,
        query: &str,
        limit: u32,
        min_score: f32,
    ) -> Result<Vec<SearchHit>, CatalogError> {
        let store = self.store()?;

        if query.trim().is_empty() {
            return Err(CatalogError::InvalidArgument(
                "search query cannot be empty".to_string(),
            ));
        }
        if limit == 0 {
            return Err(CatalogError::InvalidArgument(
                "limit must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&min_score) {
            return Err(CatalogError::InvalidArgument(
                "min_score must be between 0.0 and 1.0".to_string(),
            ));
        }

        let raw = store.search(query, u64::from(limit)).await?;
        let returned = raw.len();

        let hits: Vec<SearchHit> = raw
            .into_iter()
            .filter(|hit| hit.score >= min_score)
            .take(limit as usize)
            .collect();

        debug!(
            query,
            limit,
            min_score,
            returned,
            kept = hits.len(),
            "search completed"
        );

        Ok(hits)
    }

    pub async fn search_request(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<SearchHit>, CatalogError> {
        self.search(&request.query, request.limit, request.min_score)
            .await
    }
}
