//! Natural-language product search backed by retrieval and a chat model.

use std::fmt::Write as FmtWrite;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{AppError, CatalogError};
use crate::models::{DEFAULT_MIN_SCORE, SearchHit};
use crate::services::ProductIndexer;
use crate::services::chat::ChatModel;

const INSTRUCTIONS: &str = "You are a product search assistant for a B2B lighting catalogue. \
Use only the catalogue entries in the context. Parse technical requirements \
(dimensions, wattage, colour temperature, price range) from the question, rank the \
matching products by relevance, consider B2B pricing when a price limit is given, \
and explain briefly why each product matches. Reply in the language of the question. \
If nothing in the context matches, say so.";

/// Optional constraints on an agent query.
#[derive(Debug, Clone, Default)]
pub struct AgentQuery {
    pub max_results: u32,
    pub price_max: Option<f64>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentAnswer {
    pub query: String,
    pub enhanced_query: String,
    pub answer: String,
    pub hits: Vec<SearchHit>,
}

pub struct ProductSearchAgent {
    indexer: ProductIndexer,
    model: Box<dyn ChatModel>,
    min_score: f32,
}

impl ProductSearchAgent {
    pub fn new(indexer: ProductIndexer, model: Box<dyn ChatModel>) -> Self {
        Self {
            indexer,
            model,
            min_score: DEFAULT_MIN_SCORE,
        }
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Fold the optional constraints into the query text.
    pub fn enhance_query(query: &str, options: &AgentQuery) -> String {
        let mut enhanced = query.trim().to_string();
        if let Some(price) = options.price_max {
            let _ = write!(enhanced, " with maximum price €{}", price);
        }
        if let Some(ref category) = options.category {
            let _ = write!(enhanced, " in category {}", category);
        }
        let _ = write!(enhanced, ". Return up to {} products.", options.max_results);
        enhanced
    }

    pub async fn ask(&self, query: &str, options: &AgentQuery) -> Result<AgentAnswer, AppError> {
        if query.trim().is_empty() {
            return Err(CatalogError::InvalidArgument("query cannot be empty".to_string()).into());
        }

        let enhanced_query = Self::enhance_query(query, options);
        let hits = self
            .indexer
            .search(&enhanced_query, options.max_results.max(1), self.min_score)
            .await?;
        debug!(hits = hits.len(), "retrieved catalogue context");

        let context = render_context(&hits);
        let prompt = format!("{}\n\n{}", INSTRUCTIONS, enhanced_query);
        let answer = self.model.generate(&prompt, &context).await?;

        info!(model = self.model.model(), hits = hits.len(), "answered product query");

        Ok(AgentAnswer {
            query: query.to_string(),
            enhanced_query,
            answer,
            hits,
        })
    }
}

fn render_context(hits: &[SearchHit]) -> String {
    let mut context = String::new();
    for (i, hit) in hits.iter().enumerate() {
        let _ = writeln!(context, "[{}] (relevance {:.2})", i + 1, hit.score);
        let _ = writeln!(context, "{}", hit.text);
        context.push('\n');
    }
    context.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use crate::services::indexer::tests::ScriptedStore;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct EchoModel {
        seen: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn generate(&self, prompt: &str, context: &str) -> Result<String, ChatError> {
            self.seen
                .lock()
                .unwrap()
                .push((prompt.to_string(), context.to_string()));
            Ok("LP-60 fits".to_string())
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_enhance_query_with_all_constraints() {
        let options = AgentQuery {
            max_results: 5,
            price_max: Some(50.0),
            category: Some("Panels".to_string()),
        };
        assert_eq!(
            ProductSearchAgent::enhance_query("office panel 60x60", &options),
            "office panel 60x60 with maximum price €50 in category Panels. Return up to 5 products."
        );
    }

    #[test]
    fn test_enhance_query_without_constraints() {
        let options = AgentQuery {
            max_results: 10,
            ..Default::default()
        };
        assert_eq!(
            ProductSearchAgent::enhance_query("warm white strip", &options),
            "warm white strip. Return up to 10 products."
        );
    }

    #[tokio::test]
    async fn test_ask_passes_filtered_context_to_model() {
        let store = Arc::new(ScriptedStore::with_hits(&[0.9, 0.4]));
        let model = EchoModel::default();
        let seen = model.seen.clone();
        let agent =
            ProductSearchAgent::new(ProductIndexer::with_store(store), Box::new(model));

        let options = AgentQuery {
            max_results: 3,
            ..Default::default()
        };
        let answer = agent.ask("panel", &options).await.unwrap();

        assert_eq!(answer.answer, "LP-60 fits");
        assert_eq!(answer.hits.len(), 1);
        let seen = seen.lock().unwrap();
        assert!(seen[0].0.contains("Return up to 3 products."));
        assert!(seen[0].1.starts_with("[1] (relevance 0.90)"));
        assert!(!seen[0].1.contains("0.4"));
    }

    #[tokio::test]
    async fn test_ask_requires_ready_indexer() {
        let agent = ProductSearchAgent::new(ProductIndexer::new(), Box::new(EchoModel::default()));
        let err = agent.ask("panel", &AgentQuery::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Catalog(CatalogError::NotReady(_))));
    }
}
