//! Breadth-first ancestor traversal

use super::cancel::CancellationToken;
use super::types::{TraversalReport, TraversalState, Visit};
use crate::graph::{sort_spatially, Canvas, CanvasNode, NodeId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};

/// Callback invoked once per visited node
///
/// Returning `false` stops expansion through this node's parents only;
/// branches already queued keep going.
#[async_trait]
pub trait AncestorVisitor: Send {
    async fn visit(&mut self, visit: &Visit<'_>) -> bool;
}

/// Query for walking from a node up through its ancestors
#[derive(Debug, Clone)]
pub struct AncestorTraversal {
    /// Starting node ID
    pub origin: NodeId,
    /// Maximum depth to walk (0 = unlimited, 1 = parents only, etc.)
    pub max_depth: usize,
    /// Checked before every dequeue
    pub cancel: Option<CancellationToken>,
}

impl AncestorTraversal {
    /// Create a new traversal from a starting node
    pub fn from(origin: NodeId) -> Self {
        Self {
            origin,
            max_depth: 0,
            cancel: None,
        }
    }

    /// Set the maximum traversal depth (0 = unlimited)
    pub fn depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Attach a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn beyond_limit(&self, depth: usize) -> bool {
        self.max_depth != 0 && depth > self.max_depth
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }

    /// Execute the traversal against a canvas
    ///
    /// Visits each reachable node at most once, at the shallowest depth it
    /// is reachable from. Nodes are processed strictly one at a time: the
    /// visitor is awaited before the next node is dequeued.
    pub async fn execute<V>(&self, canvas: &Canvas, visitor: &mut V) -> TraversalReport
    where
        V: AncestorVisitor + ?Sized,
    {
        let mut report = TraversalReport::new(self.origin.clone());

        let Some(origin_node) = canvas.get_node(&self.origin) else {
            report.state = TraversalState::Done;
            return report;
        };

        let index = ParentIndex::build(canvas);
        let mut visited: HashSet<&NodeId> = HashSet::new();
        let mut worklist: VecDeque<(&CanvasNode, usize)> = VecDeque::new();
        worklist.push_back((origin_node, 0));
        report.state = TraversalState::Running;

        while let Some((node, depth)) = worklist.pop_front() {
            if self.is_cancelled() {
                report.cancelled = true;
                break;
            }
            if !visited.insert(&node.id) {
                continue;
            }

            let parents = index.parents(&node.id);
            let visit = Visit {
                node,
                depth,
                parent_count: parents.len(),
            };
            report.visited.push((node.id.clone(), depth));

            if !visitor.visit(&visit).await {
                report.pruned.push(node.id.clone());
                continue;
            }

            let next = depth + 1;
            if self.beyond_limit(next) {
                continue;
            }
            for parent in parents {
                if !visited.contains(&parent.id) {
                    worklist.push_back((*parent, next));
                }
            }
        }

        report.state = TraversalState::Done;
        report
    }
}

/// Parents of every node, precomputed once per traversal
///
/// Same ordering as [`Canvas::parents_of`].
pub struct ParentIndex<'a> {
    parents: HashMap<&'a NodeId, Vec<&'a CanvasNode>>,
}

impl<'a> ParentIndex<'a> {
    pub fn build(canvas: &'a Canvas) -> Self {
        let mut parents: HashMap<&NodeId, Vec<&CanvasNode>> = HashMap::new();

        for edge in &canvas.edges {
            let (Some(_), Some(parent)) = (
                canvas.get_node(&edge.to_node),
                canvas.get_node(&edge.from_node),
            ) else {
                continue;
            };
            let list = parents.entry(&edge.to_node).or_default();
            if !list.iter().any(|p| p.id == parent.id) {
                list.push(parent);
            }
        }

        for list in parents.values_mut() {
            sort_spatially(list);
        }

        Self { parents }
    }

    pub fn parents(&self, id: &NodeId) -> &[&'a CanvasNode] {
        self.parents.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }
}
