//! Content resolution: turning a node into text
//!
//! Resolution may perform I/O. A failure is reported to the caller as a
//! [`ResolveError`]; the assembler logs it and treats the node as blank, so
//! a missing file never aborts a traversal.

mod markdown;
mod vault;

pub use markdown::extract_section;
pub use vault::VaultResolver;

use crate::graph::{CanvasNode, NodeContent};
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while resolving node content
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("path escapes the vault: {0}")]
    OutsideVault(String),

    #[error("unsupported node content: {0}")]
    Unsupported(String),
}

/// Result type for resolution
pub type ResolveResult<T> = Result<T, ResolveError>;

/// The contract content resolvers implement.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Produce the text of `node`. Empty text is a valid answer.
    async fn resolve(&self, node: &CanvasNode) -> ResolveResult<String>;
}

/// Resolver for canvases without a backing vault
///
/// Text nodes resolve to their inline text. File nodes are unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineResolver;

#[async_trait]
impl ContentResolver for InlineResolver {
    async fn resolve(&self, node: &CanvasNode) -> ResolveResult<String> {
        match &node.content {
            NodeContent::Text { text } => Ok(text.clone()),
            NodeContent::File { file, .. } => Err(ResolveError::Unsupported(format!(
                "file node {} ({}) needs a vault",
                node.id, file
            ))),
            NodeContent::Link { .. } | NodeContent::Group { .. } => Ok(String::new()),
        }
    }
}
