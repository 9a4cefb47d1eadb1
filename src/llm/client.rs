//! Generation client abstraction and provider selection
//!
//! The question-answering and translation stages only need "prompt in, text
//! out". Providers:
//! - **OpenAI**: chat completions (also any OpenAI-compatible endpoint)
//! - **Ollama**: local inference

use crate::types::{AppError, Result};
use crate::utils::toml_config::LlmConfig;
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
///
/// All generation providers implement this trait, so the pipeline never sees
/// vendor types.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API provider (including Azure OpenAI and compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-3.5-turbo".to_string(),
    ///     temperature: 0.7,
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        temperature: f32,
    },

    /// Ollama local LLM provider
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Build a provider from configuration, resolving the API key from the environment
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        match config {
            LlmConfig::OpenAI {
                api_key_env,
                api_base,
                model,
                temperature,
            } => {
                let api_key = std::env::var(api_key_env).map_err(|_| {
                    AppError::Configuration(format!(
                        "Environment variable '{}' is not set",
                        api_key_env
                    ))
                })?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.clone(),
                    temperature: *temperature,
                })
            }
            LlmConfig::Ollama { base_url, model } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
            }),
        }
    }

    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's cargo feature is disabled or the
    /// client cannot be constructed.
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                temperature,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                *temperature,
            ))),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone()).await?,
            )),

            #[allow(unreachable_patterns)]
            _ => Err(AppError::Configuration(format!(
                "LLM provider '{}' not enabled. Check feature flags.",
                self.name()
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let openai = Provider::OpenAI {
            api_key: "".to_string(),
            api_base: "".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
        };
        assert_eq!(openai.name(), "OpenAI");
        assert_eq!(openai.model(), "gpt-3.5-turbo");

        let ollama = Provider::Ollama {
            base_url: "".to_string(),
            model: "llama3.2".to_string(),
        };
        assert_eq!(ollama.name(), "Ollama");
    }

    #[test]
    fn test_ollama_from_config_needs_no_secret() {
        let provider = Provider::from_config(&LlmConfig::Ollama {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
        })
        .unwrap();
        assert!(matches!(provider, Provider::Ollama { .. }));
    }

    #[test]
    fn test_openai_from_config_missing_key() {
        let result = Provider::from_config(&LlmConfig::OpenAI {
            api_key_env: "PRASHNA_TEST_UNSET_OPENAI_KEY".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
        });

        match result {
            Err(AppError::Configuration(msg)) => {
                assert!(msg.contains("PRASHNA_TEST_UNSET_OPENAI_KEY"))
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }
}
