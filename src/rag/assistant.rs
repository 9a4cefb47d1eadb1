//! Per-query glue: answer in the source language, then translate.

use crate::rag::knowledge_base::KnowledgeBase;
use crate::rag::qa::{RetrievalQa, validate_query};
use crate::rag::translate::Translator;
use crate::types::{AppError, AskOutcome, Result};
use std::sync::Arc;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

pub struct Assistant {
    knowledge_base: Arc<KnowledgeBase>,
    qa: RetrievalQa,
    translator: Translator,
    target_language: String,
}

impl Assistant {
    pub fn new(
        knowledge_base: Arc<KnowledgeBase>,
        qa: RetrievalQa,
        translator: Translator,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            knowledge_base,
            qa,
            translator,
            target_language: target_language.into(),
        }
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Answer `query` and translate the answer, strictly in that order.
    pub async fn ask(&self, query: &str) -> Result<AskOutcome> {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("ask", request_id = %request_id);

        async move {
            let query = validate_query(query)?;
            let index = self.knowledge_base.current().ok_or_else(|| {
                AppError::Internal("knowledge base not initialized".to_string())
            })?;

            let answer = self.qa.answer_query(query, &index).await?;
            let translation = self
                .translator
                .translate(&answer.text, &self.target_language)
                .await?;

            info!(
                grounded = answer.grounded,
                sources = answer.sources.len(),
                language = %translation.language,
                "Query answered"
            );

            Ok(AskOutcome {
                request_id,
                query: query.to_string(),
                answer,
                translation,
            })
        }
        .instrument(span)
        .await
    }
}
