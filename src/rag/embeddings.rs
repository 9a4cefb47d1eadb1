//! Embedding service abstraction.
//!
//! Indexing and querying must share one [`Embedder`]: similarity scores are
//! only meaningful between vectors from the same model.

use crate::types::{AppError, Result};
use crate::utils::toml_config::EmbeddingConfig;
use async_trait::async_trait;
use std::sync::Arc;

/// Maps text to fixed-dimension vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts; output order matches input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Service("Embedding service returned no vector".to_string()))
    }

    /// Identifier of the embedding model
    fn model_name(&self) -> &str;
}

/// Check that a batch response lines up with its request.
fn check_batch(expected: usize, vectors: Vec<Vec<f32>>, provider: &str) -> Result<Vec<Vec<f32>>> {
    if vectors.len() != expected {
        return Err(AppError::Service(format!(
            "{} returned {} embeddings for {} inputs",
            provider,
            vectors.len(),
            expected
        )));
    }
    Ok(vectors)
}

// ============================================================================
// Provider Selection
// ============================================================================

/// Embedding provider with resolved credentials.
#[derive(Debug, Clone)]
pub enum EmbeddingProvider {
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },
    Ollama {
        base_url: String,
        model: String,
    },
}

impl EmbeddingProvider {
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        match config {
            EmbeddingConfig::OpenAI {
                api_key_env,
                api_base,
                model,
            } => {
                let api_key = std::env::var(api_key_env).map_err(|_| {
                    AppError::Configuration(format!(
                        "Environment variable '{}' is not set",
                        api_key_env
                    ))
                })?;
                Ok(EmbeddingProvider::OpenAI {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.clone(),
                })
            }
            EmbeddingConfig::Ollama { base_url, model } => Ok(EmbeddingProvider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
            }),
        }
    }

    pub fn create_embedder(&self) -> Result<Arc<dyn Embedder>> {
        match self {
            #[cfg(feature = "openai")]
            EmbeddingProvider::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Arc::new(OpenAIEmbedder::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            ))),

            #[cfg(feature = "ollama")]
            EmbeddingProvider::Ollama { base_url, model } => {
                Ok(Arc::new(OllamaEmbedder::new(base_url, model.clone())))
            }

            #[allow(unreachable_patterns)]
            _ => Err(AppError::Configuration(
                "Embedding provider not enabled. Check feature flags.".into(),
            )),
        }
    }
}

// ============================================================================
// OpenAI
// ============================================================================

#[cfg(feature = "openai")]
pub use openai_embedder::OpenAIEmbedder;

#[cfg(feature = "openai")]
mod openai_embedder {
    use super::*;
    use crate::llm::openai::map_openai_error;
    use async_openai::{Client, config::OpenAIConfig, types::CreateEmbeddingRequestArgs};

    pub struct OpenAIEmbedder {
        client: Client<OpenAIConfig>,
        model: String,
    }

    impl OpenAIEmbedder {
        pub fn new(api_key: String, api_base: String, model: String) -> Self {
            let config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(api_base);
            Self {
                client: Client::with_config(config),
                model,
            }
        }
    }

    #[async_trait]
    impl Embedder for OpenAIEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }

            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(texts.to_vec())
                .build()
                .map_err(|e| AppError::Internal(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(map_openai_error)?;

            let mut data = response.data;
            data.sort_by_key(|entry| entry.index);
            check_batch(
                texts.len(),
                data.into_iter().map(|entry| entry.embedding).collect(),
                "OpenAI",
            )
        }

        fn model_name(&self) -> &str {
            &self.model
        }
    }
}

// ============================================================================
// Ollama
// ============================================================================

#[cfg(feature = "ollama")]
pub use ollama_embedder::OllamaEmbedder;

#[cfg(feature = "ollama")]
mod ollama_embedder {
    use super::*;
    use crate::llm::ollama::parse_base_url;
    use ollama_rs::{
        Ollama,
        generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest},
    };

    pub struct OllamaEmbedder {
        client: Ollama,
        model: String,
    }

    impl OllamaEmbedder {
        pub fn new(base_url: &str, model: String) -> Self {
            let (host, port) = parse_base_url(base_url);
            Self {
                client: Ollama::new(host, port),
                model,
            }
        }
    }

    #[async_trait]
    impl Embedder for OllamaEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }

            let request = GenerateEmbeddingsRequest::new(
                self.model.clone(),
                EmbeddingsInput::Multiple(texts.to_vec()),
            );
            let response = self
                .client
                .generate_embeddings(request)
                .await
                .map_err(|e| AppError::Service(format!("Ollama embedding error: {}", e)))?;

            check_batch(texts.len(), response.embeddings, "Ollama")
        }

        fn model_name(&self) -> &str {
            &self.model
        }
    }
}
