//! TOML-based configuration for Prashna
//!
//! All settings live in `prashna.toml`. Secrets are never written to the file;
//! the file names the environment variables that hold them (which may come from
//! a `.env` file loaded at startup).
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock setup: PDFs under `data/`, 1000-character chunks without overlap, the
//! `marathichatbot` collection, four retrieved chunks and Marathi answers.

use crate::rag::chunker::ChunkingStrategy;
use crate::types::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure loaded from prashna.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrashnaConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Generation service used for answering and translating
    #[serde(default)]
    pub llm: LlmConfig,

    /// Embedding service shared by indexing and querying
    #[serde(default)]
    pub embeddings: EmbeddingConfig,

    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    #[serde(default)]
    pub rag: RagConfig,

    #[serde(default)]
    pub translation: TranslationConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    OpenAI {
        /// Environment variable containing API key
        #[serde(default = "default_openai_key_env")]
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        #[serde(default = "default_chat_model")]
        model: String,
        #[serde(default = "default_temperature")]
        temperature: f32,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        model: String,
    },
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig::OpenAI {
            api_key_env: default_openai_key_env(),
            api_base: default_openai_base(),
            model: default_chat_model(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum EmbeddingConfig {
    OpenAI {
        #[serde(default = "default_openai_key_env")]
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        #[serde(default = "default_embedding_model")]
        model: String,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        model: String,
    },
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        EmbeddingConfig::OpenAI {
            api_key_env: default_openai_key_env(),
            api_base: default_openai_base(),
            model: default_embedding_model(),
        }
    }
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

// ============= Vector Store Configuration =============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum VectorStoreConfig {
    /// Process-local store; contents are lost on exit
    #[default]
    Memory,
    Pinecone {
        #[serde(default = "default_pinecone_key_env")]
        api_key_env: String,
        /// Data-plane host of the index, e.g. `https://marathichatbot-abc123.svc.us-east-1.pinecone.io`
        index_host: String,
    },
}

fn default_pinecone_key_env() -> String {
    "PINECONE_API_KEY".to_string()
}

// ============= RAG Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    #[serde(default = "default_source_directory")]
    pub source_directory: PathBuf,

    /// Glob matched against paths relative to `source_directory`
    #[serde(default = "default_glob")]
    pub glob: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default)]
    pub chunk_overlap: usize,

    #[serde(default)]
    pub chunking_strategy: ChunkingStrategy,

    #[serde(default = "default_collection_name")]
    pub index_collection_name: String,

    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,

    #[serde(default = "default_embedding_batch_size")]
    pub embedding_batch_size: usize,

    /// Drop the collection before indexing so removed documents disappear
    #[serde(default)]
    pub clear_before_build: bool,
}

fn default_source_directory() -> PathBuf {
    PathBuf::from("data")
}

fn default_glob() -> String {
    "**/*.pdf".to_string()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_collection_name() -> String {
    "marathichatbot".to_string()
}

fn default_retrieval_k() -> usize {
    4
}

fn default_embedding_batch_size() -> usize {
    64
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            source_directory: default_source_directory(),
            glob: default_glob(),
            chunk_size: default_chunk_size(),
            chunk_overlap: 0,
            chunking_strategy: ChunkingStrategy::default(),
            index_collection_name: default_collection_name(),
            retrieval_k: default_retrieval_k(),
            embedding_batch_size: default_embedding_batch_size(),
            clear_before_build: false,
        }
    }
}

// ============= Translation Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_source_language")]
    pub source_language: String,

    #[serde(default = "default_target_language")]
    pub target_language: String,
}

fn default_source_language() -> String {
    "English".to_string()
}

fn default_target_language() -> String {
    "Marathi".to_string()
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
        }
    }
}

// ============= Retry Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt for embedding, search and generation
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Upper bound for any single external call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    8000
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl RetryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl PrashnaConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path.as_ref()) {
            Err(ConfigError::FileNotFound(missing)) => {
                tracing::warn!(path = %missing.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PrashnaConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate internal consistency (does not touch the environment)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rag = &self.rag;

        if rag.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "rag.chunk_size must be at least 1".to_string(),
            ));
        }
        if rag.chunk_overlap >= rag.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "rag.chunk_overlap ({}) must be smaller than rag.chunk_size ({})",
                rag.chunk_overlap, rag.chunk_size
            )));
        }
        if rag.retrieval_k == 0 {
            return Err(ConfigError::ValidationError(
                "rag.retrieval_k must be at least 1".to_string(),
            ));
        }
        if rag.embedding_batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "rag.embedding_batch_size must be at least 1".to_string(),
            ));
        }
        if rag.index_collection_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "rag.index_collection_name must not be empty".to_string(),
            ));
        }
        glob::Pattern::new(&rag.glob).map_err(|e| {
            ConfigError::ValidationError(format!("rag.glob '{}' is invalid: {}", rag.glob, e))
        })?;

        if self.translation.target_language.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "translation.target_language must not be empty".to_string(),
            ));
        }

        if self.retry.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "retry.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::ValidationError(
                "retry.initial_backoff_ms must not exceed retry.max_backoff_ms".to_string(),
            ));
        }

        Ok(())
    }

    /// Check that every secret the configured providers need is present
    pub fn validate_env(&self) -> Result<(), ConfigError> {
        for name in self.required_env_vars() {
            self.validate_env_var(name)?;
        }
        Ok(())
    }

    fn required_env_vars(&self) -> Vec<&str> {
        let mut vars = Vec::new();
        if let LlmConfig::OpenAI { api_key_env, .. } = &self.llm {
            vars.push(api_key_env.as_str());
        }
        if let EmbeddingConfig::OpenAI { api_key_env, .. } = &self.embeddings {
            if !vars.contains(&api_key_env.as_str()) {
                vars.push(api_key_env.as_str());
            }
        }
        if let VectorStoreConfig::Pinecone { api_key_env, .. } = &self.vector_store {
            vars.push(api_key_env.as_str());
        }
        vars
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> String {
        r#"
[server]
host = "0.0.0.0"
port = 8080
log_level = "debug"
log_format = "json"

[llm]
provider = "ollama"
base_url = "http://localhost:11434"
model = "llama3.2"

[embeddings]
provider = "openai"
model = "text-embedding-3-small"

[vector_store]
provider = "pinecone"
index_host = "https://marathichatbot-abc.svc.us-east-1.pinecone.io"

[rag]
source_directory = "docs"
glob = "**/*.txt"
chunk_size = 500
chunk_overlap = 50
chunking_strategy = "word"
index_collection_name = "notes"
retrieval_k = 6

[translation]
target_language = "Hindi"

[retry]
max_retries = 5
request_timeout_secs = 10
"#
        .to_string()
    }

    #[test]
    fn test_parse_config() {
        let config = PrashnaConfig::from_toml_str(&create_test_config()).expect("config parses");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(matches!(config.llm, LlmConfig::Ollama { ref model, .. } if model == "llama3.2"));
        assert!(matches!(
            config.embeddings,
            EmbeddingConfig::OpenAI { ref model, ref api_key_env, .. }
                if model == "text-embedding-3-small" && api_key_env == "OPENAI_API_KEY"
        ));
        assert!(matches!(
            config.vector_store,
            VectorStoreConfig::Pinecone { ref api_key_env, .. } if api_key_env == "PINECONE_API_KEY"
        ));
        assert_eq!(config.rag.source_directory, PathBuf::from("docs"));
        assert_eq!(config.rag.chunk_size, 500);
        assert_eq!(config.rag.chunk_overlap, 50);
        assert_eq!(config.rag.chunking_strategy, ChunkingStrategy::Word);
        assert_eq!(config.rag.retrieval_k, 6);
        assert_eq!(config.translation.target_language, "Hindi");
        assert_eq!(config.translation.source_language, "English");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.initial_backoff_ms, 500);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = PrashnaConfig::from_toml_str("").expect("empty config is valid");

        assert_eq!(config.rag.source_directory, PathBuf::from("data"));
        assert_eq!(config.rag.glob, "**/*.pdf");
        assert_eq!(config.rag.chunk_size, 1000);
        assert_eq!(config.rag.chunk_overlap, 0);
        assert_eq!(config.rag.index_collection_name, "marathichatbot");
        assert_eq!(config.rag.retrieval_k, 4);
        assert_eq!(config.translation.target_language, "Marathi");
        assert!(matches!(config.vector_store, VectorStoreConfig::Memory));
        assert!(matches!(config.llm, LlmConfig::OpenAI { ref model, .. } if model == "gpt-3.5-turbo"));
    }

    #[test]
    fn test_validation_overlap_must_be_smaller_than_size() {
        let result = PrashnaConfig::from_toml_str(
            r#"
[rag]
chunk_size = 100
chunk_overlap = 100
"#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validation_zero_chunk_size() {
        let mut config = PrashnaConfig::default();
        config.rag.chunk_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validation_zero_k() {
        let result = PrashnaConfig::from_toml_str("[rag]\nretrieval_k = 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validation_bad_glob() {
        let result = PrashnaConfig::from_toml_str("[rag]\nglob = \"**/[.pdf\"\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_unknown_provider_is_parse_error() {
        let result = PrashnaConfig::from_toml_str("[llm]\nprovider = \"carrier-pigeon\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = PrashnaConfig::load("/definitely/not/here/prashna.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));

        let config = PrashnaConfig::load_or_default("/definitely/not/here/prashna.toml")
            .expect("falls back to defaults");
        assert_eq!(config.rag.chunk_size, 1000);
    }

    #[test]
    fn test_required_env_vars_deduplicated() {
        let config = PrashnaConfig::default();
        assert_eq!(config.required_env_vars(), vec!["OPENAI_API_KEY"]);
    }

    #[test]
    fn test_missing_env_var_reported_by_name() {
        let config = PrashnaConfig::default();
        let err = config
            .validate_env_var("PRASHNA_TEST_SURELY_UNSET_VAR")
            .unwrap_err();
        assert!(err.to_string().contains("PRASHNA_TEST_SURELY_UNSET_VAR"));
    }
}
