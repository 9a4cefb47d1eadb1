//! Generation Service Clients
//!
//! This module provides a unified interface for the language-model calls the
//! pipeline makes: one to answer a question from retrieved context and one to
//! translate the answer. Provider-specific code stays behind [`LLMClient`].
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `openai` - OpenAI API (GPT-3.5, GPT-4, compatible endpoints)
//! - `ollama` - Local Ollama server
//!
//! # Example
//!
//! ```ignore
//! use prashna::llm::Provider;
//!
//! let client = Provider::from_config(&config.llm)?.create_client().await?;
//! let text = client.generate("What is 2+2?").await?;
//! ```
//!
//! All calls made by the pipeline are wrapped in a [`retry::RetryPolicy`].

/// Core LLM client trait and provider selection.
pub mod client;
/// Retry and timeout policy for external calls.
pub mod retry;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, Provider};
pub use retry::RetryPolicy;
