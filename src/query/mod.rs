//! Ancestor traversal over a canvas
//!
//! Provides the breadth-first, cycle-safe walk from a start node through
//! its parents, with depth limits, branch pruning and cancellation.

mod cancel;
mod traverse;
mod types;

pub use cancel::CancellationToken;
pub use traverse::{AncestorTraversal, AncestorVisitor, ParentIndex};
pub use types::{TraversalReport, TraversalState, Visit};
