//! Node representation on a canvas

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
///
/// Serializes as a plain string. Canvas documents use short hex ids, nodes
/// built in code get a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new random NodeId (UUID-based)
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Create a NodeId from an existing string id
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// How a node obtains its text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeContent {
    /// Inline markdown text
    Text {
        #[serde(default)]
        text: String,
    },
    /// Reference to a file in the vault, optionally narrowed to a `#heading`
    File {
        file: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subpath: Option<String>,
    },
    /// Web link
    Link { url: String },
    /// Visual group box
    Group {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

/// Conversational role a node speaks in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeRole {
    #[default]
    User,
    Assistant,
}

/// A note on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    /// Unique identifier
    pub id: NodeId,
    /// Where the text comes from
    #[serde(flatten)]
    pub content: NodeContent,
    /// Horizontal position (left edge)
    #[serde(default)]
    pub x: f64,
    /// Vertical position (top edge)
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Role tag written by the plugin; only `"assistant"` is meaningful
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_role: Option<String>,
}

impl CanvasNode {
    /// Create a text node with a fresh id
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content(NodeContent::Text { text: text.into() })
    }

    /// Create a file node with a fresh id
    pub fn file(path: impl Into<String>) -> Self {
        Self::with_content(NodeContent::File {
            file: path.into(),
            subpath: None,
        })
    }

    fn with_content(content: NodeContent) -> Self {
        Self {
            id: NodeId::new(),
            content,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            color: None,
            chat_role: None,
        }
    }

    /// Replace the generated id
    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the canvas position
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Narrow a file node to a `#heading` section
    pub fn with_subpath(mut self, subpath: impl Into<String>) -> Self {
        if let NodeContent::File { subpath: slot, .. } = &mut self.content {
            *slot = Some(subpath.into());
        }
        self
    }

    /// Tag the node as spoken by the assistant
    pub fn as_assistant(mut self) -> Self {
        self.chat_role = Some("assistant".to_string());
        self
    }

    /// Role of the node; anything but an explicit assistant tag is the user
    pub fn role(&self) -> NodeRole {
        match self.chat_role.as_deref() {
            Some("assistant") => NodeRole::Assistant,
            _ => NodeRole::User,
        }
    }

    /// File stem for file nodes, used as the note title
    pub fn title(&self) -> Option<&str> {
        match &self.content {
            NodeContent::File { file, .. } => std::path::Path::new(file)
                .file_stem()
                .and_then(|s| s.to_str()),
            _ => None,
        }
    }
}
