//! Retrieval Augmented Generation (RAG) Pipeline
//!
//! # Module Structure
//!
//! - [`rag::loader`](crate::rag::loader) - Reads matching files from the source directory
//! - [`rag::chunker`](crate::rag::chunker) - Text chunking for document processing
//! - [`rag::embeddings`](crate::rag::embeddings) - Embedding service abstraction
//! - [`rag::indexing`](crate::rag::indexing) - Builds a vector index from a directory
//! - [`rag::knowledge_base`](crate::rag::knowledge_base) - Lazily built, rebuildable index
//! - [`rag::qa`](crate::rag::qa) - Retrieval and grounded answer generation
//! - [`rag::translate`](crate::rag::translate) - Answer translation
//! - [`rag::assistant`](crate::rag::assistant) - Per-query orchestration
//!
//! # RAG Pipeline
//!
//! 1. **Ingestion** - Documents are loaded, chunked and embedded
//! 2. **Storage** - Embeddings are upserted into the vector store
//! 3. **Retrieval** - The query is embedded and the closest chunks retrieved
//! 4. **Generation** - The LLM answers from the retrieved context
//! 5. **Translation** - The answer is translated into the target language
//!
//! # Example
//!
//! ```ignore
//! use prashna::rag::{indexing::IndexingPipeline, qa::RetrievalQa};
//!
//! let pipeline = IndexingPipeline::new(embedder.clone(), store, &config.rag, retry.clone())?;
//! let (index, report) = pipeline.build_index(Path::new("data")).await?;
//!
//! let qa = RetrievalQa::new(embedder, llm, 4, retry);
//! let answer = qa.answer_query("What is the capital of France?", &index).await?;
//! ```

pub mod assistant;
pub mod chunker;
pub mod embeddings;
pub mod indexing;
pub mod knowledge_base;
pub mod loader;
pub mod qa;
pub mod translate;
