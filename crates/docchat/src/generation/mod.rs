//! Query rewriting and answer generation on top of an `LlmProvider`

pub mod answer;
pub mod prompt;
pub mod rewriter;

pub use answer::{limit_sentences, AnswerGenerator};
pub use prompt::{PromptBuilder, DECLINE_ANSWER};
pub use rewriter::QueryRewriter;
