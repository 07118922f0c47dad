//! Assistant chat models

use serde::{Deserialize, Serialize};

use super::EntryId;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    Error,
}

/// Citation from an assistant answer back to a journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub entry_id: EntryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

impl SourceRef {
    #[must_use]
    pub const fn new(entry_id: EntryId) -> Self {
        Self {
            entry_id,
            similarity: None,
        }
    }
}

/// A message in the assistant conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    /// Empty for user and error messages
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

impl ChatMessage {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            sources: Vec::new(),
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>, sources: Vec<SourceRef>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            sources,
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Error,
            text: text.into(),
            sources: Vec::new(),
        }
    }
}

/// Question sent to the assistant service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Number of candidate entries the assistant may ground its answer in
    pub limit: usize,
}

/// Assistant answer with the entries it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    pub sources: Vec<SourceRef>,
}
