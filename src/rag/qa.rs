//! Retrieval-augmented question answering.
//!
//! Retrieves the chunks most similar to the question and "stuffs" them into
//! one prompt for the generation service.

use crate::llm::{LLMClient, RetryPolicy};
use crate::rag::embeddings::Embedder;
use crate::rag::indexing::VectorIndex;
use crate::types::{AppError, Answer, Result, RetrievedContext};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const QA_SYSTEM_PROMPT: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Prompt body: context chunks separated by blank lines, then the question.
pub fn build_qa_prompt(context: &RetrievedContext, query: &str) -> String {
    let chunks: Vec<&str> = context
        .chunks
        .iter()
        .map(|result| result.entry.content.as_str())
        .collect();
    format!(
        "{}\n\nQuestion: {}\nHelpful Answer:",
        chunks.join("\n\n"),
        query
    )
}

pub struct RetrievalQa {
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LLMClient>,
    k: usize,
    retry: RetryPolicy,
}

impl RetrievalQa {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LLMClient>,
        k: usize,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            embedder,
            llm,
            k: k.max(1),
            retry,
        }
    }

    /// Chunks most similar to `query`, best first.
    ///
    /// Fails with [`AppError::EmptyIndex`] before any service call when the
    /// index holds no entries.
    pub async fn retrieve(&self, query: &str, index: &VectorIndex) -> Result<RetrievedContext> {
        let query = validate_query(query)?;

        if index.is_empty() {
            return Err(AppError::EmptyIndex);
        }

        if index.embedding_model() != self.embedder.model_name() {
            warn!(
                index_model = index.embedding_model(),
                query_model = self.embedder.model_name(),
                "Query embedder differs from the one that built the index; relevance will suffer"
            );
        }

        let embedder = &self.embedder;
        let embedding = self
            .retry
            .run("embeddings.embed", move || embedder.embed(query))
            .await?;

        let k = self.k;
        let embedding_ref = embedding.as_slice();
        let mut chunks = self
            .retry
            .run("vector_store.search", move || index.query(embedding_ref, k))
            .await?;

        chunks.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        chunks.truncate(k);
        debug!(retrieved = chunks.len(), "Retrieved context");

        Ok(RetrievedContext { chunks })
    }

    /// Answer `query` from the documents in `index`.
    ///
    /// An empty index, or a search that finds nothing, yields
    /// [`Answer::no_information`] rather than an error.
    pub async fn answer_query(&self, query: &str, index: &VectorIndex) -> Result<Answer> {
        let query = validate_query(query)?;

        let context = match self.retrieve(query, index).await {
            Ok(context) => context,
            Err(AppError::EmptyIndex) => {
                info!("Index is empty, returning no-information answer");
                return Ok(Answer::no_information());
            }
            Err(e) => return Err(e),
        };

        // Hosted stores can lag behind their reported counts
        if context.is_empty() {
            info!("No context retrieved, returning no-information answer");
            return Ok(Answer::no_information());
        }

        let prompt = build_qa_prompt(&context, query);
        let llm = &self.llm;
        let prompt_ref = prompt.as_str();
        let text = self
            .retry
            .run("llm.answer", move || {
                llm.generate_with_system(QA_SYSTEM_PROMPT, prompt_ref)
            })
            .await?;

        Ok(Answer {
            text: text.trim().to_string(),
            sources: context.sources(),
            grounded: true,
        })
    }
}

/// Trimmed query, or [`AppError::EmptyQuery`] if nothing is left.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(AppError::EmptyQuery);
    }
    Ok(trimmed)
}
