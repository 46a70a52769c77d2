use serde::Deserialize;

use crate::domain::retrieval::RetrievalConfig;
use crate::infrastructure::embedding::DEFAULT_EMBEDDING_MODEL;
use crate::infrastructure::generation::DEFAULT_GENERATION_MODEL;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub providers: ProvidersConfig,
    pub retrieval: RetrievalKnobs,
    pub graph: GraphConfig,
    pub ingestion: IngestionConfig,
    /// Directory for persisted graph and index snapshots
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// OpenAI-backed embedding and generation settings. The API key is
/// taken from the OPENAI_API_KEY environment variable, never from
/// config files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub embedding_model: String,
    pub generation_model: String,
    pub timeout_secs: u64,
    /// Embedding cache time to live in seconds
    pub embedding_cache_ttl_secs: u64,
    pub embedding_cache_capacity: u64,
}

/// Retrieval tuning, deserialized flat and converted to the domain
/// [`RetrievalConfig`]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalKnobs {
    pub dense_top_k: usize,
    pub max_expansion: usize,
    pub select_top_k: usize,
    pub similarity_weight: f32,
    pub centrality_weight: f32,
    pub path_support_weight: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Edges below this confidence are dropped at build time
    pub min_confidence: f32,
    /// Run the LLM entailment pass in addition to pattern extraction
    pub semantic_extraction: bool,
    /// Documents with more clauses than this skip the entailment pass
    pub max_semantic_clauses: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Segments shorter than this many characters are discarded
    pub min_clause_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            providers: ProvidersConfig::default(),
            retrieval: RetrievalKnobs::default(),
            graph: GraphConfig::default(),
            ingestion: IngestionConfig::default(),
            data_dir: "data".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            timeout_secs: 60,
            embedding_cache_ttl_secs: 3600,
            embedding_cache_capacity: 10_000,
        }
    }
}

impl Default for RetrievalKnobs {
    fn default() -> Self {
        let config = RetrievalConfig::default();
        Self {
            dense_top_k: config.dense_top_k,
            max_expansion: config.max_expansion,
            select_top_k: config.select_top_k,
            similarity_weight: config.similarity_weight,
            centrality_weight: config.centrality_weight,
            path_support_weight: config.path_support_weight,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            semantic_extraction: false,
            max_semantic_clauses: 60,
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            min_clause_chars: 50,
        }
    }
}

impl RetrievalKnobs {
    /// Convert into the domain retrieval configuration
    pub fn to_retrieval_config(&self) -> RetrievalConfig {
        RetrievalConfig::default()
            .with_dense_top_k(self.dense_top_k)
            .with_max_expansion(self.max_expansion)
            .with_select_top_k(self.select_top_k)
            .with_weights(
                self.similarity_weight,
                self.centrality_weight,
                self.path_support_weight,
            )
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_retrieval_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.retrieval.dense_top_k, 5);
        assert_eq!(config.retrieval.select_top_k, 8);
        assert_eq!(config.providers.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert!(!config.graph.semantic_extraction);
    }

    #[test]
    fn test_retrieval_knobs_round_trip() {
        let knobs = RetrievalKnobs {
            dense_top_k: 3,
            max_expansion: 10,
            select_top_k: 4,
            similarity_weight: 0.5,
            centrality_weight: 0.3,
            path_support_weight: 0.2,
        };

        let config = knobs.to_retrieval_config();
        assert_eq!(config.dense_top_k, 3);
        assert_eq!(config.max_expansion, 10);
        assert_eq!(config.select_top_k, 4);
        assert!((config.similarity_weight - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_log_format_deserializes_lowercase() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
