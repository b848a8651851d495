//! Stopping a traversal from outside
//!
//! Hold a clone of the token and call [`CancellationToken::cancel`] from any
//! task. [`AncestorTraversal`](super::AncestorTraversal) looks at the token
//! before it dequeues the next node, so the node in the visitor finishes
//! first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag for one or more traversals
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    stop: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any clone has asked the walk to stop
    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Ask every traversal holding this token to stop
    ///
    /// Returns `true` for the call that flipped the flag.
    pub fn cancel(&self) -> bool {
        !self.stop.swap(true, Ordering::AcqRel)
    }
}
