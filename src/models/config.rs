use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::search::OutputFormat;
use crate::error::ConfigError;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 1536;
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_COLLECTION: &str = "product_catalog";
pub const DEFAULT_BATCH_SIZE: u32 = 100;
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
pub const DEFAULT_MIN_SCORE: f32 = 0.5;

const APP_DIR: &str = "cypher-rag";
const PROJECT_DIR: &str = ".cypher-rag";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub chat: ChatConfig,
}

impl Config {
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn project_path() -> Option<PathBuf> {
        std::env::current_dir()
            .ok()
            .map(|p| p.join(PROJECT_DIR).join(CONFIG_FILE))
    }

    /// Load the layered configuration. Ranges are checked separately by
    /// [`Config::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_layers(
            Self::global_path().as_deref(),
            Self::project_path().as_deref(),
            |key| std::env::var(key).ok(),
        )
    }

    /// Built-in defaults, then the global file, then the project file, then
    /// the environment. Files are merged key by key, so a project file only
    /// overrides what it names.
    pub fn load_layers<F>(
        global: Option<&Path>,
        project: Option<&Path>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut merged = toml::Table::new();
        for path in [global, project].into_iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                merge_tables(&mut merged, toml::from_str(&content)?);
            }
        }

        let mut config: Config = toml::Value::Table(merged).try_into()?;
        config.apply_env(lookup)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay values from the environment. `lookup` is injected so tests
    /// don't have to touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.embedding.api_key = Some(key.clone());
            self.chat.openai_api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.embedding.url = url.clone();
            self.chat.openai_url = url;
        }
        if let Some(model) = get("OPENAI_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.chat.openai_model = model;
        }
        if let Some(key) = get("GOOGLE_API_KEY") {
            self.chat.google_api_key = Some(key);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.chat.gemini_model = model;
        }
        if let Some(driver) = get("CYPHER_VECTOR_DRIVER") {
            self.vector_store.driver = driver.parse().map_err(ConfigError::ValidationError)?;
        }
        if let Some(url) = get("CYPHER_VECTOR_URL") {
            self.vector_store.url = url;
        }
        if let Some(key) = get("CYPHER_VECTOR_API_KEY") {
            self.vector_store.api_key = Some(key);
        }
        if let Some(collection) = get("CYPHER_COLLECTION") {
            self.vector_store.collection = collection;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indexing.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "indexing.batch_size must be at least 1".to_string(),
            ));
        }
        if self.search.default_limit == 0 {
            return Err(ConfigError::ValidationError(
                "search.default_limit must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.search.default_min_score) {
            return Err(ConfigError::ValidationError(
                "search.default_min_score must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.indexing.item_timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "indexing.item_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.embedding.dimension == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.dimension must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_openai_url")]
    pub url: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_dimension")]
    pub dimension: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_openai_url() -> String {
    DEFAULT_OPENAI_URL.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_dimension() -> u32 {
    DEFAULT_EMBEDDING_DIMENSION
}

fn default_timeout() -> u64 {
    60
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_openai_url(),
            model: default_embedding_model(),
            dimension: default_dimension(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorDriver {
    #[default]
    Qdrant,
    #[serde(alias = "postgres", alias = "pgvector")]
    PostgreSQL,
}

impl std::str::FromStr for VectorDriver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qdrant" => Ok(VectorDriver::Qdrant),
            "postgresql" | "postgres" | "pgvector" => Ok(VectorDriver::PostgreSQL),
            _ => Err(format!("unknown vector driver: {}", s)),
        }
    }
}

impl std::fmt::Display for VectorDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorDriver::Qdrant => write!(f, "qdrant"),
            VectorDriver::PostgreSQL => write!(f, "postgresql"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default)]
    pub driver: VectorDriver,

    #[serde(default = "default_qdrant_url")]
    pub url: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// PostgreSQL schema; tables live in `public` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default = "default_pool_max")]
    pub pool_max: u32,

    #[serde(default = "default_pool_acquire_timeout")]
    pub pool_acquire_timeout: u32,
}

fn default_qdrant_url() -> String {
    DEFAULT_QDRANT_URL.to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_pool_max() -> u32 {
    5
}

fn default_pool_acquire_timeout() -> u32 {
    30
}

impl VectorStoreConfig {
    pub fn qualified_table_name(&self) -> String {
        match self.schema {
            Some(ref schema) => format!("{}.{}", schema, self.collection),
            None => self.collection.clone(),
        }
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            driver: VectorDriver::default(),
            url: default_qdrant_url(),
            collection: default_collection(),
            api_key: None,
            schema: None,
            pool_max: default_pool_max(),
            pool_acquire_timeout: default_pool_acquire_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Upper bound on a single product write; unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_timeout_secs: Option<u64>,
}

fn default_batch_size() -> u32 {
    DEFAULT_BATCH_SIZE
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            item_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    #[serde(default = "default_min_score")]
    pub default_min_score: f32,

    #[serde(default)]
    pub default_format: OutputFormat,
}

fn default_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

fn default_min_score() -> f32 {
    DEFAULT_MIN_SCORE
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_min_score: default_min_score(),
            default_format: OutputFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatProvider {
    #[default]
    OpenAi,
    Gemini,
}

impl std::fmt::Display for ChatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatProvider::OpenAi => write!(f, "openai"),
            ChatProvider::Gemini => write!(f, "gemini"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub provider: ChatProvider,

    #[serde(default = "default_openai_url")]
    pub openai_url: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_gemini_url")]
    pub gemini_url: String,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,

    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_gemini_url() -> String {
    DEFAULT_GEMINI_URL.to_string()
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_chat_timeout() -> u64 {
    120
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: ChatProvider::default(),
            openai_url: default_openai_url(),
            openai_model: default_openai_model(),
            openai_api_key: None,
            gemini_url: default_gemini_url(),
            gemini_model: default_gemini_model(),
            google_api_key: None,
            timeout_secs: default_chat_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.embedding.url, DEFAULT_OPENAI_URL);
        assert_eq!(config.vector_store.url, DEFAULT_QDRANT_URL);
        assert_eq!(config.vector_store.collection, DEFAULT_COLLECTION);
        assert_eq!(config.indexing.batch_size, 100);
        assert_eq!(config.search.default_limit, 10);
        assert!((config.search.default_min_score - 0.5).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("GOOGLE_API_KEY", "g-test"),
            ("GEMINI_MODEL", "gemini-pro"),
            ("CYPHER_VECTOR_DRIVER", "postgres"),
            ("CYPHER_VECTOR_URL", "postgres://localhost/catalog"),
            ("CYPHER_COLLECTION", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.chat.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.chat.google_api_key.as_deref(), Some("g-test"));
        assert_eq!(config.chat.gemini_model, "gemini-pro");
        assert_eq!(config.vector_store.driver, VectorDriver::PostgreSQL);
        assert_eq!(config.vector_store.url, "postgres://localhost/catalog");
        // blank values are ignored
        assert_eq!(config.vector_store.collection, DEFAULT_COLLECTION);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.indexing.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.default_min_score = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.default_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.indexing.item_timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_driver_in_env_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(|key| (key == "CYPHER_VECTOR_DRIVER").then(|| "mysql".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_layers_merge_global_project_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        std::fs::write(
            &global,
            "[vector_store]\nurl = \"http://global-qdrant:6334\"\ncollection = \"global_coll\"\n\n[search]\ndefault_limit = 7\ndefault_min_score = 0.7\n",
        )
        .unwrap();
        std::fs::write(&project, "[search]\ndefault_limit = 3\n").unwrap();

        let config = Config::load_layers(
            Some(global.as_path()),
            Some(project.as_path()),
            |key| (key == "CYPHER_COLLECTION").then(|| "env_coll".to_string()),
        )
        .unwrap();

        // project overrides only the key it sets
        assert_eq!(config.search.default_limit, 3);
        assert!((config.search.default_min_score - 0.7).abs() < f32::EPSILON);
        // global survives a project file that doesn't mention it
        assert_eq!(config.vector_store.url, "http://global-qdrant:6334");
        // environment wins over both files
        assert_eq!(config.vector_store.collection, "env_coll");
        // untouched sections keep built-in defaults
        assert_eq!(config.indexing.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_layers_without_files_are_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let config = Config::load_layers(Some(missing.as_path()), None, |_| None).unwrap();
        assert_eq!(config.vector_store.url, DEFAULT_QDRANT_URL);
        assert!(config.indexing.item_timeout_secs.is_none());
    }

    #[test]
    fn test_broken_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("config.toml");
        std::fs::write(&project, "[search\n").unwrap();
        assert!(matches!(
            Config::load_layers(None, Some(project.as_path()), |_| None),
            Err(ConfigError::TomlParseError(_))
        ));
    }

    #[test]
    fn test_save_and_load_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.vector_store.collection = "led_catalog".to_string();
        config.chat.provider = ChatProvider::Gemini;
        config.save_to(&path).unwrap();

        let loaded = Config::load_layers(None, Some(path.as_path()), |_| None).unwrap();
        assert_eq!(loaded.vector_store.collection, "led_catalog");
        assert_eq!(loaded.chat.provider, ChatProvider::Gemini);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[indexing]\nbatch_size = 25\n").unwrap();
        assert_eq!(config.indexing.batch_size, 25);
        assert_eq!(config.embedding.model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.vector_store.driver, VectorDriver::Qdrant);
    }

    #[test]
    fn test_qualified_table_name() {
        let mut config = VectorStoreConfig::default();
        assert_eq!(config.qualified_table_name(), "product_catalog");
        config.schema = Some("rag".to_string());
        assert_eq!(config.qualified_table_name(), "rag.product_catalog");
    }
}
