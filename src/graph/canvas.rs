//! Canvas: a snapshot of notes and the edges between them

use super::edge::Edge;
use super::engine::{ChatError, ChatResult};
use super::node::{CanvasNode, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use uuid::Uuid;

/// Unique identifier for a canvas
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanvasId(String);

impl CanvasId {
    /// Create a new random CanvasId (UUID-based)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a CanvasId from a string (file path, semantic name)
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CanvasId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CanvasId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CanvasId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// On-disk shape of a `.canvas` document
#[derive(Debug, Default, Serialize, Deserialize)]
struct CanvasDocument {
    #[serde(default)]
    nodes: Vec<CanvasNode>,
    #[serde(default)]
    edges: Vec<Edge>,
}

/// A read-only view of one canvas
///
/// Nodes are keyed by id; edges keep document order, which is the final
/// tie-break when ordering parents.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    /// Unique identifier
    pub id: CanvasId,
    /// Nodes in this canvas
    pub nodes: HashMap<NodeId, CanvasNode>,
    /// Edges in document order (dangling edges are kept but inert)
    pub edges: Vec<Edge>,
}

impl Canvas {
    /// Create an empty canvas with the given id
    pub fn new(id: impl Into<CanvasId>) -> Self {
        Self {
            id: id.into(),
            nodes: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// Parse a canvas document
    pub fn from_json(id: impl Into<CanvasId>, json: &str) -> ChatResult<Self> {
        let doc: CanvasDocument = serde_json::from_str(json)?;
        let mut canvas = Self::new(id);
        for node in doc.nodes {
            if canvas.nodes.contains_key(&node.id) {
                return Err(ChatError::DuplicateNode(node.id.to_string()));
            }
            canvas.add_node(node);
        }
        canvas.edges = doc.edges;
        Ok(canvas)
    }

    /// Read and parse a canvas file; the path becomes the canvas id
    pub async fn load(path: impl AsRef<Path>) -> ChatResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(CanvasId::from_string(path.display().to_string()), &json)
    }

    /// Serialize back into the document layout
    pub fn to_json(&self) -> ChatResult<String> {
        let mut nodes: Vec<CanvasNode> = self.nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        let doc = CanvasDocument {
            nodes,
            edges: self.edges.clone(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Add a node, replacing any node with the same id
    pub fn add_node(&mut self, node: CanvasNode) -> NodeId {
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        id
    }

    /// Add an edge; endpoints are not checked
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Convenience: connect parent -> child
    pub fn connect(&mut self, parent: &NodeId, child: &NodeId) {
        self.add_edge(Edge::new(parent.clone(), child.clone()));
    }

    /// Get a node by ID
    pub fn get_node(&self, id: &NodeId) -> Option<&CanvasNode> {
        self.nodes.get(id)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges pointing into `id` whose parent exists, in document order
    pub fn inbound_edges(&self, id: &NodeId) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| &e.to_node == id && self.nodes.contains_key(&e.from_node))
            .collect()
    }

    /// All parents of `id`, in traversal order
    ///
    /// Ordered left-to-right, then top-to-bottom; ties keep edge order.
    /// Repeated edges yield one parent and dangling edges yield none.
    pub fn parents_of(&self, id: &NodeId) -> Vec<&CanvasNode> {
        let mut seen = HashSet::new();
        let mut parents: Vec<&CanvasNode> = self
            .edges
            .iter()
            .filter(|e| &e.to_node == id)
            .filter_map(|e| self.nodes.get(&e.from_node))
            .filter(|n| seen.insert(n.id.clone()))
            .collect();
        sort_spatially(&mut parents);
        parents
    }

    /// All children of `id`, in the same spatial order as parents
    pub fn children_of(&self, id: &NodeId) -> Vec<&CanvasNode> {
        let mut seen = HashSet::new();
        let mut children: Vec<&CanvasNode> = self
            .edges
            .iter()
            .filter(|e| &e.from_node == id)
            .filter_map(|e| self.nodes.get(&e.to_node))
            .filter(|n| seen.insert(n.id.clone()))
            .collect();
        sort_spatially(&mut children);
        children
    }

    /// Whether `id` has no parents
    pub fn is_root(&self, id: &NodeId) -> bool {
        !self
            .edges
            .iter()
            .any(|e| &e.to_node == id && self.nodes.contains_key(&e.from_node))
    }
}

/// Stable sort by x then y.
pub(crate) fn sort_spatially(nodes: &mut [&CanvasNode]) {
    nodes.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
}
