//! Search-related models for queries and results.

use serde::{Deserialize, Serialize};

use super::product::Metadata;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Machine-parseable JSON format
    Json,
    /// Documentation-friendly Markdown format
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Parameters of one catalogue search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Natural language query text
    pub query: String,

    /// Maximum results to return
    pub limit: u32,

    /// Minimum similarity threshold (0.0-1.0)
    pub min_score: f32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: super::config::DEFAULT_SEARCH_LIMIT,
            min_score: super::config::DEFAULT_MIN_SCORE,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }
}

/// A single vector store match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Indexed product text
    pub text: String,

    /// Metadata stored with the product
    pub metadata: Metadata,

    /// Similarity score (0.0-1.0, higher is better)
    pub score: f32,
}

impl SearchHit {
    pub fn sku(&self) -> Option<&str> {
        self.metadata.get("sku").and_then(|v| v.as_str())
    }
}

/// Hits for one query, as printed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub duration_ms: u64,
}

impl SearchResults {
    pub fn new(query: String, results: Vec<SearchHit>, duration_ms: u64) -> Self {
        Self {
            query,
            results,
            duration_ms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "md".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_search_request_defaults() {
        let request = SearchRequest::new("warm white panel");
        assert_eq!(request.limit, 10);
        assert!((request.min_score - 0.5).abs() < f32::EPSILON);

        let request = request.with_limit(3).with_min_score(0.8);
        assert_eq!(request.limit, 3);
        assert!((request.min_score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_hit_sku() {
        let mut metadata = Metadata::new();
        metadata.insert("sku".to_string(), "X1".into());
        let hit = SearchHit {
            text: "Product: Panel".to_string(),
            metadata,
            score: 0.9,
        };
        assert_eq!(hit.sku(), Some("X1"));
    }
}
