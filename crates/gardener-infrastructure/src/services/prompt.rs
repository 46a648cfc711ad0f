//! Prompt assembly
//!
//! One place builds every chat prompt: system preamble, retrieved context
//! tagged `file:start-end`, the recent conversation, and the question.

use gardener_domain::entities::{ConversationMessage, MessageRole};

/// One retrieved chunk ready for the prompt
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    /// `file:start-end` citation tag
    pub citation: String,
    /// Chunk text
    pub text: String,
    /// Similarity score
    pub score: f32,
}

/// Numbered context block, one entry per retrieved chunk.
#[must_use]
pub fn format_context_block(chunks: &[RetrievedChunk]) -> String {
    let mut block = String::from("Context from the codebase:\n");
    for (index, chunk) in chunks.iter().enumerate() {
        block.push_str(&format!(
            "{}. [{}] (score {:.2})\n{}\n",
            index + 1,
            chunk.citation,
            chunk.score,
            chunk.text.trim_end(),
        ));
    }
    block
}

/// Assemble the full prompt for one chat turn.
#[must_use]
pub fn build_prompt(
    project_name: &str,
    context_block: Option<&str>,
    history: &[ConversationMessage],
    question: &str,
) -> String {
    let mut prompt = format!(
        "You are a codebase analysis assistant specialized in the '{project_name}' project. \
         Answer using the provided code context when it is relevant, and cite files by their \
         file:line tags. Say so plainly when the context does not contain the answer.\n\n"
    );

    if let Some(context) = context_block {
        prompt.push_str(context);
        prompt.push('\n');
    }

    if !history.is_empty() {
        prompt.push_str("Conversation so far:\n");
        for message in history {
            let speaker = match message.role {
                MessageRole::User => "User",
                MessageRole::Assistant => "Assistant",
                MessageRole::System => "Note",
            };
            prompt.push_str(&format!("{speaker}: {}\n", message.content));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("User: {question}\nAssistant:"));
    prompt
}
