//! CanvasRegistry: holds canvases and hands out snapshots for assembly

use super::canvas::{Canvas, CanvasId};
use dashmap::DashMap;
use thiserror::Error;

/// Errors that can occur in canvas operations
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Canvas not found: {0}")]
    CanvasNotFound(CanvasId),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Duplicate node id in canvas: {0}")]
    DuplicateNode(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Completion failed: {0}")]
    Completion(#[from] crate::completion::CompletionError),
}

/// Result type for canvas operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Registry of loaded canvases
///
/// The host may replace a canvas at any time; assembly always works on a
/// snapshot taken with [`CanvasRegistry::snapshot`], so one assembly never
/// sees interleaved mutation.
#[derive(Debug, Default)]
pub struct CanvasRegistry {
    canvases: DashMap<CanvasId, Canvas>,
}

impl CanvasRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            canvases: DashMap::new(),
        }
    }

    /// Create or replace a canvas
    ///
    /// Returns the canvas ID.
    pub fn upsert(&self, canvas: Canvas) -> CanvasId {
        let id = canvas.id.clone();
        self.canvases.insert(id.clone(), canvas);
        id
    }

    /// Clone the current state of a canvas
    pub fn snapshot(&self, id: &CanvasId) -> ChatResult<Canvas> {
        self.canvases
            .get(id)
            .map(|r| r.clone())
            .ok_or_else(|| ChatError::CanvasNotFound(id.clone()))
    }

    /// Remove a canvas
    pub fn remove(&self, id: &CanvasId) -> Option<Canvas> {
        self.canvases.remove(id).map(|(_, canvas)| canvas)
    }

    /// List all canvas IDs
    pub fn list(&self) -> Vec<CanvasId> {
        self.canvases.iter().map(|r| r.key().clone()).collect()
    }

    /// Get the number of canvases
    pub fn len(&self) -> usize {
        self.canvases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canvases.is_empty()
    }

    /// Check if a canvas exists
    pub fn contains(&self, id: &CanvasId) -> bool {
        self.canvases.contains_key(id)
    }
}
