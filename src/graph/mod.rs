//! Core graph data structures

mod canvas;
mod edge;
mod engine;
mod node;


pub use canvas::{Canvas, CanvasId};
pub use edge::{Edge, EdgeId};
pub use engine::{CanvasRegistry, ChatError, ChatResult};
pub use node::{CanvasNode, NodeContent, NodeId, NodeRole};

pub(crate) use canvas::sort_spatially;
