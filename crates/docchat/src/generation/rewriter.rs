//! History-aware rewriting of follow-up questions

use std::sync::Arc;

use crate::error::Result;
use crate::providers::LlmProvider;
use crate::types::Turn;

use super::prompt::PromptBuilder;

/// Labels models sometimes put in front of the rewritten question
const ANSWER_LABELS: [&str; 3] = ["standalone question:", "rewritten question:", "question:"];

/// Turns a follow-up into a question that stands on its own
#[derive(Clone)]
pub struct QueryRewriter {
    llm: Arc<dyn LlmProvider>,
}

impl QueryRewriter {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Rewrite `question` against `history`
    ///
    /// With no history there is nothing to resolve and the model is not called.
    pub async fn rewrite(&self, history: &[Turn], question: &str) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let messages = PromptBuilder::rewrite_messages(history, question);
        let raw = self.llm.complete(&messages).await?;
        let standalone = clean_rewrite(&raw);

        if standalone.is_empty() {
            tracing::warn!("Rewriter returned nothing usable, keeping the original question");
            return Ok(question.to_string());
        }

        tracing::debug!("Rewrote '{}' -> '{}'", question, standalone);
        Ok(standalone)
    }
}

/// Strip labels, quotes and whitespace from model output
fn clean_rewrite(raw: &str) -> String {
    let mut text = raw.trim();

    for label in ANSWER_LABELS {
        if text.len() >= label.len()
            && text.is_char_boundary(label.len())
            && text[..label.len()].eq_ignore_ascii_case(label)
        {
            text = text[label.len()..].trim_start();
            break;
        }
    }

    text.trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c.is_whitespace())
        .to_string()
}
