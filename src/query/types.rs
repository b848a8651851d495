//! Traversal types and result structures

use crate::graph::{CanvasNode, NodeId};

/// Lifecycle of one traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalState {
    /// Worklist holds only the origin
    #[default]
    Ready,
    /// Popping and visiting
    Running,
    /// Worklist drained (or cancelled)
    Done,
}

/// What the visitor sees for each node
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    /// The node being visited
    pub node: &'a CanvasNode,
    /// Distance from the origin (origin = 0)
    pub depth: usize,
    /// Number of live parents of this node
    pub parent_count: usize,
}

impl Visit<'_> {
    /// A node with no parents is a graph root
    pub fn is_root(&self) -> bool {
        self.parent_count == 0
    }
}

/// Result of an ancestor traversal
#[derive(Debug, Clone)]
pub struct TraversalReport {
    /// Starting node
    pub origin: NodeId,
    /// Visited nodes with their depth, in visit order
    pub visited: Vec<(NodeId, usize)>,
    /// Nodes whose visitor asked not to expand their parents
    pub pruned: Vec<NodeId>,
    /// Whether a cancellation token stopped the walk early
    pub cancelled: bool,
    pub state: TraversalState,
}

impl TraversalReport {
    pub fn new(origin: NodeId) -> Self {
        Self {
            origin,
            visited: Vec::new(),
            pruned: Vec::new(),
            cancelled: false,
            state: TraversalState::Ready,
        }
    }

    /// Visited node ids in order
    pub fn visit_order(&self) -> Vec<&NodeId> {
        self.visited.iter().map(|(id, _)| id).collect()
    }

    /// Depth at which `id` was visited, if it was
    pub fn depth_of(&self, id: &NodeId) -> Option<usize> {
        self.visited.iter().find(|(v, _)| v == id).map(|(_, d)| *d)
    }

    /// Get the maximum depth reached
    pub fn max_depth(&self) -> usize {
        self.visited.iter().map(|(_, d)| *d).max().unwrap_or(0)
    }
}
