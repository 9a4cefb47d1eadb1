//! # Prashna - document-grounded answers in your language
//!
//! Prashna indexes a directory of documents (PDFs by default), answers
//! questions from the indexed content, and translates each answer into a
//! configured target language (Marathi by default).
//!
//! ## Overview
//!
//! Prashna can be used in two ways:
//!
//! 1. **As a standalone server or CLI** - Run the `prashna` binary
//! 2. **As a library** - Wire the pipeline into your own Rust project
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use prashna::{AppState, PrashnaConfig};
//!
//! #[tokio::main]
//! async fn main() -> prashna::Result<()> {
//!     let config = PrashnaConfig::load_or_default("prashna.toml")?;
//!     let state = AppState::from_config(config).await?;
//!
//!     state.knowledge_base.ensure_built().await?;
//!     let outcome = state.assistant.ask("What is the capital of Maharashtra?").await?;
//!     println!("{}\n{}", outcome.answer.text, outcome.translation.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `openai` | OpenAI chat and embeddings (default) |
//! | `ollama` | Ollama local inference and embeddings (default) |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`cli`] - Command-line parsing and colored output
//! - [`db`] - Vector stores (in-memory, Pinecone)
//! - [`llm`] - Generation clients and the retry policy
//! - [`rag`] - Loading, chunking, indexing, QA and translation
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Vector stores.
pub mod db;
/// Generation clients and retry policy.
pub mod llm;
/// Retrieval Augmented Generation pipeline.
pub mod rag;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

pub use db::vectorstore::{VectorStore, VectorStoreProvider};
pub use llm::{LLMClient, Provider, RetryPolicy};
pub use rag::assistant::Assistant;
pub use rag::embeddings::{Embedder, EmbeddingProvider};
pub use rag::knowledge_base::KnowledgeBase;
pub use types::{AppError, Result};
pub use utils::toml_config::PrashnaConfig;

use crate::rag::{indexing::IndexingPipeline, qa::RetrievalQa, translate::Translator};
use axum::Router;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// External services the pipeline talks to.
#[derive(Clone)]
pub struct Services {
    pub embedder: Arc<dyn Embedder>,
    pub llm: Arc<dyn LLMClient>,
    pub store: Arc<dyn VectorStore>,
}

impl Services {
    /// Resolve providers and credentials from configuration.
    pub async fn from_config(config: &PrashnaConfig) -> Result<Self> {
        let embedder = EmbeddingProvider::from_config(&config.embeddings)?.create_embedder()?;
        let llm: Arc<dyn LLMClient> =
            Arc::from(Provider::from_config(&config.llm)?.create_client().await?);
        let store = VectorStoreProvider::from_config(&config.vector_store)?.create_store()?;

        tracing::info!(
            llm = llm.model_name(),
            embeddings = embedder.model_name(),
            store = store.provider_name(),
            "Services configured"
        );

        Ok(Self {
            embedder,
            llm,
            store,
        })
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PrashnaConfig>,
    pub knowledge_base: Arc<KnowledgeBase>,
    pub assistant: Arc<Assistant>,
}

impl AppState {
    pub async fn from_config(config: PrashnaConfig) -> Result<Self> {
        let services = Services::from_config(&config).await?;
        Self::with_services(config, services)
    }

    /// Wire the pipeline around already constructed services.
    pub fn with_services(config: PrashnaConfig, services: Services) -> Result<Self> {
        let retry = RetryPolicy::from_config(&config.retry);

        let pipeline = IndexingPipeline::new(
            services.embedder.clone(),
            services.store,
            &config.rag,
            retry.clone(),
        )?;
        let knowledge_base = Arc::new(KnowledgeBase::new(
            pipeline,
            config.rag.source_directory.clone(),
        ));

        let qa = RetrievalQa::new(
            services.embedder,
            services.llm.clone(),
            config.rag.retrieval_k,
            retry.clone(),
        );
        let translator = Translator::new(
            services.llm,
            config.translation.source_language.clone(),
            retry,
        );
        let assistant = Arc::new(Assistant::new(
            knowledge_base.clone(),
            qa,
            translator,
            config.translation.target_language.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            knowledge_base,
            assistant,
        })
    }
}

/// Router with every API route under `/api`, plus CORS and request tracing.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::routes::create_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
