//! Grounded answer generation

use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::providers::LlmProvider;
use crate::retrieval::ScoredChunk;
use crate::types::Turn;

use super::prompt::{PromptBuilder, DECLINE_ANSWER};

/// Answers a standalone question from retrieved context
#[derive(Clone)]
pub struct AnswerGenerator {
    llm: Arc<dyn LlmProvider>,
    max_sentences: usize,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, max_sentences: usize) -> Self {
        Self {
            llm,
            max_sentences: max_sentences.max(1),
        }
    }

    /// Produce an answer using only `context`
    ///
    /// Without any context there is nothing to ground on, so the decline answer
    /// is returned without calling the model.
    pub async fn generate(
        &self,
        question: &str,
        context: &[ScoredChunk],
        history: &[Turn],
    ) -> Result<String> {
        if context.is_empty() {
            return Ok(DECLINE_ANSWER.to_string());
        }

        let context_block = PromptBuilder::build_context(context);
        let messages = PromptBuilder::answer_messages(history, question, &context_block);
        let raw = self.llm.complete(&messages).await?;

        let answer = limit_sentences(raw.trim(), self.max_sentences);
        if answer.is_empty() {
            tracing::warn!("Model returned an empty answer for '{}'", question);
            return Ok(DECLINE_ANSWER.to_string());
        }
        Ok(answer)
    }
}

/// Keep at most `max` sentences of `text`
pub fn limit_sentences(text: &str, max: usize) -> String {
    let mut kept = 0;
    let mut out = String::with_capacity(text.len());

    for sentence in text.split_sentence_bounds() {
        if kept == max {
            break;
        }
        out.push_str(sentence);
        if !sentence.trim().is_empty() {
            kept += 1;
        }
    }

    out.trim().to_string()
}
