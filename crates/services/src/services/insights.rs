//! AI-generated text: motivational quotes and journal trend summaries.
//!
//! Only the prompt building and the zero-entries short circuit live here; the
//! generation itself is delegated to a [`TextGenerator`].

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use super::claude_api::ClaudeApiError;

/// Returned without calling the generator when there is nothing to analyze.
pub const NOT_ENOUGH_ENTRIES: &str =
    "There are not enough entries to analyze yet. Write at least one reflection.";

const QUOTE_SYSTEM: &str = "You are a stoic philosopher and a drill sergeant.";

const JOURNAL_SYSTEM: &str =
    "You are an assistant that analyzes a user's nightly journal entries and identifies trends.";

/// Something that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, ClaudeApiError>;
}

/// Stand-in used when no API key is configured; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(&self, _prompt: &str, _system: Option<&str>) -> Result<String, ClaudeApiError> {
        Err(ClaudeApiError::MissingApiKey)
    }
}

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("generation failed: {0}")]
    Generation(#[from] ClaudeApiError),
    #[error("generation returned no text")]
    EmptyResponse,
}

#[derive(Clone)]
pub struct InsightService {
    generator: Arc<dyn TextGenerator>,
    quote_language: String,
}

impl InsightService {
    pub fn new(generator: Arc<dyn TextGenerator>, quote_language: impl Into<String>) -> Self {
        Self {
            generator,
            quote_language: quote_language.into(),
        }
    }

    /// A short original quote about discipline, without surrounding quotation marks.
    pub async fn motivational_quote(&self) -> Result<String, InsightError> {
        let prompt = quote_prompt(&self.quote_language);
        let text = self
            .generator
            .generate(&prompt, Some(QUOTE_SYSTEM))
            .await
            .inspect_err(|e| warn!(error = %e, "Quote generation failed"))?;

        let quote = strip_quotes(&text);
        if quote.is_empty() {
            return Err(InsightError::EmptyResponse);
        }
        Ok(quote.to_string())
    }

    /// Summary of positive and negative trends across `entries`.
    pub async fn analyze_journal_trends(&self, entries: &[String]) -> Result<String, InsightError> {
        if entries.is_empty() {
            return Ok(NOT_ENOUGH_ENTRIES.to_string());
        }

        let prompt = journal_prompt(entries);
        let summary = self
            .generator
            .generate(&prompt, Some(JOURNAL_SYSTEM))
            .await
            .inspect_err(|e| warn!(error = %e, "Journal analysis failed"))?;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(InsightError::EmptyResponse);
        }
        info!(entry_count = entries.len(), "Journal trends analyzed");
        Ok(summary.to_string())
    }
}

fn quote_prompt(language: &str) -> String {
    format!(
        "Generate a single, short, powerful and original motivational quote about discipline, \
         self-control or conquering oneself. Write it in {language}. \
         Reply with the quote only and do not use quotation marks."
    )
}

fn journal_prompt(entries: &[String]) -> String {
    let mut prompt = String::from(
        "Analyze the following journal entries and summarize the trends (positive and negative) \
         based on keywords or repeated topics that emerge over time, so the user can derive \
         insight from their journal.\n\nJournal entries:\n",
    );
    for entry in entries {
        prompt.push_str("- ");
        prompt.push_str(entry.trim());
        prompt.push('\n');
    }
    prompt
}

fn strip_quotes(text: &str) -> &str {
    text.trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”' | '«' | '»'))
        .trim()
}
