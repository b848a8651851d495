//! Canvas Chat: conversations assembled from a canvas of notes
//!
//! A canvas is a directed graph of notes. Selecting a note and asking for a
//! completion walks the note's ancestors breadth-first, resolves each one to
//! text, and packs them into a role-tagged message list that fits a token
//! budget.
//!
//! # Core Concepts
//!
//! - **Canvas**: nodes (text, file, link, group) joined by edges; an edge runs
//!   from parent to child
//! - **Traversal**: cycle-safe BFS over parents with depth limits and pruning
//! - **Assembly**: system prompt first, then oldest ancestor to the selected
//!   note, truncated to the budget
//!
//! # Example
//!
//! ```
//! use canvas_chat::{Canvas, CanvasNode};
//!
//! let mut canvas = Canvas::new("notes");
//! let question = canvas.add_node(CanvasNode::text("What is a DAG?"));
//! let follow_up = canvas.add_node(CanvasNode::text("Give an example."));
//! canvas.connect(&question, &follow_up);
//! assert_eq!(canvas.parents_of(&follow_up).len(), 1);
//! ```

mod api;
mod graph;
pub mod assemble;
pub mod budget;
pub mod completion;
pub mod config;
pub mod query;
pub mod resolve;
pub mod template;

pub use api::ChatEngine;
pub use assemble::{
    Assembly, AssemblyOptions, Message, MessageAssembler, Role, SYSTEM_PROMPT_MARKER,
};
pub use budget::{BudgetAccountant, CharEstimate, TokenCounter};
pub use completion::{CompletionClient, CompletionError, CompletionRequest, MockCompletionClient};
pub use config::{ChatConfig, ConfigError};
pub use graph::{
    Canvas, CanvasId, CanvasNode, CanvasRegistry, ChatError, ChatResult, Edge, EdgeId, NodeContent,
    NodeId, NodeRole,
};
pub use query::{AncestorTraversal, AncestorVisitor, CancellationToken, TraversalReport, Visit};
pub use resolve::{ContentResolver, InlineResolver, ResolveError, VaultResolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
