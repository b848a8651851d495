use async_trait::async_trait;
use canvas_chat::resolve::ResolveResult;
use canvas_chat::{CanvasNode, ContentResolver, InlineResolver, NodeId, ResolveError};
use std::collections::HashSet;
use std::sync::Mutex;

/// Inline resolver that records every call
#[derive(Default)]
pub struct CountingResolver {
    calls: Mutex<Vec<NodeId>>,
}

impl CountingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<NodeId> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn was_queried(&self, id: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c.as_str() == id)
    }
}

#[async_trait]
impl ContentResolver for CountingResolver {
    async fn resolve(&self, node: &CanvasNode) -> ResolveResult<String> {
        self.calls.lock().unwrap().push(node.id.clone());
        InlineResolver.resolve(node).await
    }
}

/// Inline resolver that fails for the listed nodes
pub struct FailingResolver {
    failing: HashSet<NodeId>,
}

impl FailingResolver {
    pub fn new<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            failing: ids.into_iter().map(NodeId::from).collect(),
        }
    }
}

#[async_trait]
impl ContentResolver for FailingResolver {
    async fn resolve(&self, node: &CanvasNode) -> ResolveResult<String> {
        if self.failing.contains(&node.id) {
            return Err(ResolveError::Io {
                path: node.id.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            });
        }
        InlineResolver.resolve(node).await
    }
}
