//! Prompt templates for query rewriting and grounded answering

use crate::providers::ChatMessage;
use crate::retrieval::ScoredChunk;
use crate::types::Turn;

const CONTEXTUALIZE_SYSTEM: &str = "Given a chat history and the latest user question \
which might reference context in the chat history, formulate a standalone question \
which can be understood without the chat history. Do NOT answer the question, \
just reformulate it if needed and otherwise return it as is.";

const QA_SYSTEM: &str = "You are an assistant for question-answering text from PDF. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, say that you don't know. \
Use three sentences maximum and keep the answer concise. \
Make sure your answers are to-the-point.";

/// Answer given when nothing relevant could be retrieved
pub const DECLINE_ANSWER: &str = "I don't know. The uploaded documents do not cover that.";

/// Prompt builder for the two model calls of a query
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved chunks into the context block, best match first
    pub fn build_context(chunks: &[ScoredChunk]) -> String {
        chunks
            .iter()
            .map(|scored| scored.chunk.content.trim())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Messages asking the model to turn `question` into a standalone question
    pub fn rewrite_messages(history: &[Turn], question: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(CONTEXTUALIZE_SYSTEM));
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(question));
        messages
    }

    /// Messages asking the model to answer from `context` only
    pub fn answer_messages(history: &[Turn], question: &str, context: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(format!("{}\n\n{}", QA_SYSTEM, context)));
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(question));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ChatRole;
    use crate::types::{Chunk, Document};

    #[test]
    fn test_rewrite_messages_layout() {
        let history = vec![
            Turn::user("What is the capital of France?"),
            Turn::assistant("Paris."),
        ];
        let messages = PromptBuilder::rewrite_messages(&history, "How big is it?");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, ChatRole::System);
        assert!(messages[0].content.contains("Do NOT answer the question"));
        assert_eq!(messages[2].role, ChatRole::Assistant);
        assert_eq!(messages[3].content, "How big is it?");
    }

    #[test]
    fn test_answer_messages_embed_context() {
        let doc = Document::new("f.pdf", "The capital of France is Paris.".into(), 1, 10);
        let chunk = Chunk::new(&doc, 0, 0, 31, doc.text.clone());
        let context = PromptBuilder::build_context(&[ScoredChunk { chunk, score: 0.9 }]);

        let messages = PromptBuilder::answer_messages(&[], "What is the capital?", &context);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("three sentences maximum"));
        assert!(messages[0].content.ends_with("The capital of France is Paris."));
        assert_eq!(messages[1].role, ChatRole::User);
    }
}
