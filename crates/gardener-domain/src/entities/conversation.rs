//! Conversation history entities
//!
//! Per-project chat history plus scratch analysis state. The in-memory
//! copy is bounded; pruning drops the oldest non-system messages first.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    /// The developer asking questions
    User,
    /// The model's replies
    Assistant,
    /// Markers recorded by the pipeline (analysis completed, etc.)
    System,
}

/// One message in a project's conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Message author
    pub role: MessageRole,
    /// Message body
    pub content: String,
    /// Append time; messages are totally ordered by append within a project
    pub timestamp: DateTime<Utc>,
    /// Free-form metadata (retrieval stats, capability notes)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ConversationMessage {
    /// Create a message stamped now.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Durable per-project conversation and analysis state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectContext {
    /// Owning project
    pub project_id: String,
    /// Retained messages, oldest first
    pub messages: Vec<ConversationMessage>,
    /// Scratch analysis state carried between runs
    #[serde(default)]
    pub analysis_state: BTreeMap<String, serde_json::Value>,
}

impl ProjectContext {
    /// Create an empty context for a project.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            messages: Vec::new(),
            analysis_state: BTreeMap::new(),
        }
    }

    /// Append a message, keeping the retained count within `cap`.
    ///
    /// When over cap, the oldest non-system messages are dropped first;
    /// system messages survive until only system messages remain.
    pub fn push_bounded(&mut self, message: ConversationMessage, cap: usize) {
        self.messages.push(message);
        if self.messages.len() <= cap {
            return;
        }
        let mut excess = self.messages.len() - cap;
        self.messages.retain(|m| {
            if excess > 0 && m.role != MessageRole::System {
                excess -= 1;
                false
            } else {
                true
            }
        });
        // All-system history: nothing else left to drop, so trim from the front.
        if excess > 0 {
            self.messages.drain(..excess);
        }
    }

    /// Last `n` messages in chronological order.
    #[must_use]
    pub fn recent(&self, n: usize) -> &[ConversationMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}
