//! Message assembly
//!
//! Turns the ancestry of a note into the ordered, role-tagged message list
//! sent to a chat completion endpoint.

mod assembler;

pub use assembler::{AssemblyOptions, MessageAssembler};

use crate::graph::{NodeId, NodeRole};
use serde::{Deserialize, Serialize};

/// Reserved prefix that turns a root note into the system prompt
pub const SYSTEM_PROMPT_MARKER: &str = "SYSTEM PROMPT";

/// Speaker of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl From<NodeRole> for Role {
    fn from(role: NodeRole) -> Self {
        match role {
            NodeRole::User => Role::User,
            NodeRole::Assistant => Role::Assistant,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        f.write_str(s)
    }
}

/// One chat message. Content is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub(crate) fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Output of one assembly
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembly {
    /// System message first (when there is one), then oldest ancestor to
    /// the selected note
    pub messages: Vec<Message>,
    /// Budget units charged, system prompt included
    pub budget_used: usize,
    /// Whether an ancestor was cut to fit the budget
    pub truncated: bool,
    /// Root note that supplied the system prompt, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_override: Option<NodeId>,
    /// Whether the assembly was cancelled before finishing
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cancelled: bool,
}

impl Assembly {
    /// No completion call should be made
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Default::default()
        }
    }
}

/// Whether `text` opens with the system prompt marker
pub fn is_system_prompt(text: &str) -> bool {
    text.trim().starts_with(SYSTEM_PROMPT_MARKER)
}

/// Prompt carried by a marked note: the text after the marker, trimmed
pub fn parse_system_prompt(text: &str) -> Option<&str> {
    text.trim()
        .strip_prefix(SYSTEM_PROMPT_MARKER)
        .map(str::trim)
}
