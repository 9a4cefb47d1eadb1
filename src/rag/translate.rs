//! Answer translation through the generation service.

use crate::llm::{LLMClient, RetryPolicy};
use crate::types::{Result, TranslatedAnswer};
use std::sync::Arc;
use tracing::debug;

pub fn build_translation_prompt(text: &str, source_language: &str, target_language: &str) -> String {
    format!(
        "Translate the following {source} text to {target}:\n\n{text}\n\n{target} translation:",
        source = source_language,
        target = target_language,
        text = text
    )
}

pub struct Translator {
    llm: Arc<dyn LLMClient>,
    source_language: String,
    retry: RetryPolicy,
}

impl Translator {
    pub fn new(llm: Arc<dyn LLMClient>, source_language: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            llm,
            source_language: source_language.into(),
            retry,
        }
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    /// Translate `text` into `target_language`.
    ///
    /// Blank input is returned as an empty translation without a service call.
    /// Failures surface as errors; the untranslated text is never substituted.
    pub async fn translate(&self, text: &str, target_language: &str) -> Result<TranslatedAnswer> {
        if text.trim().is_empty() {
            return Ok(TranslatedAnswer {
                text: String::new(),
                language: target_language.to_string(),
            });
        }

        let prompt = build_translation_prompt(text, &self.source_language, target_language);
        let llm = &self.llm;
        let prompt_ref = prompt.as_str();
        let translated = self
            .retry
            .run("llm.translate", move || llm.generate(prompt_ref))
            .await?;

        debug!(target_language, chars = translated.len(), "Translated answer");

        Ok(TranslatedAnswer {
            text: translated.trim().to_string(),
            language: target_language.to_string(),
        })
    }
}
