//! Transport-independent API layer.
//!
//! `ChatEngine` is the single entry point for consumers. It owns the canvas
//! registry, the resolver and the configuration, snapshots a canvas before
//! every assembly and hands non-empty assemblies to a completion client.

use std::sync::Arc;

use tracing::info;

use crate::assemble::{Assembly, MessageAssembler};
use crate::completion::{CompletionClient, CompletionRequest};
use crate::config::ChatConfig;
use crate::graph::{CanvasId, CanvasNode, CanvasRegistry, ChatError, ChatResult, NodeId};
use crate::query::CancellationToken;
use crate::resolve::ContentResolver;
use crate::template;

/// Single entry point for all consumer-facing operations.
#[derive(Clone)]
pub struct ChatEngine {
    registry: Arc<CanvasRegistry>,
    resolver: Arc<dyn ContentResolver>,
    config: ChatConfig,
}

impl ChatEngine {
    /// Create a new engine.
    pub fn new(
        registry: Arc<CanvasRegistry>,
        resolver: Arc<dyn ContentResolver>,
        config: ChatConfig,
    ) -> Self {
        Self {
            registry,
            resolver,
            config,
        }
    }

    pub fn registry(&self) -> &CanvasRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn assembler(&self) -> MessageAssembler {
        MessageAssembler::new(self.resolver.clone(), self.config.assembly_options())
    }

    // --- Read ---

    /// Parents of a note, in traversal order
    pub fn parents(
        &self,
        canvas_id: &CanvasId,
        node_id: &NodeId,
    ) -> ChatResult<Vec<CanvasNode>> {
        let canvas = self.registry.snapshot(canvas_id)?;
        if canvas.get_node(node_id).is_none() {
            return Err(ChatError::NodeNotFound(node_id.to_string()));
        }
        Ok(canvas.parents_of(node_id).into_iter().cloned().collect())
    }

    /// Assemble the conversation ending at `node_id`
    pub async fn build_messages(
        &self,
        canvas_id: &CanvasId,
        node_id: &NodeId,
    ) -> ChatResult<Assembly> {
        self.build_messages_with(canvas_id, node_id, None).await
    }

    /// Like [`build_messages`](Self::build_messages), stoppable through `cancel`
    pub async fn build_messages_with(
        &self,
        canvas_id: &CanvasId,
        node_id: &NodeId,
        cancel: Option<CancellationToken>,
    ) -> ChatResult<Assembly> {
        let canvas = self.registry.snapshot(canvas_id)?;
        if canvas.get_node(node_id).is_none() {
            return Err(ChatError::NodeNotFound(node_id.to_string()));
        }

        let assembler = match cancel {
            Some(token) => self.assembler().with_cancellation(token),
            None => self.assembler(),
        };
        let assembly = assembler.assemble(&canvas, node_id).await;
        info!(
            canvas = %canvas_id,
            node = %node_id,
            messages = assembly.messages.len(),
            tokens = assembly.budget_used,
            truncated = assembly.truncated,
            "assembled conversation"
        );
        Ok(assembly)
    }

    /// Request body for the conversation ending at `node_id`, or `None` when
    /// there is nothing to send
    pub async fn request(
        &self,
        canvas_id: &CanvasId,
        node_id: &NodeId,
    ) -> ChatResult<Option<CompletionRequest>> {
        let assembly = self.build_messages(canvas_id, node_id).await?;
        Ok(CompletionRequest::from_assembly(&assembly, &self.config))
    }

    /// Expanded text of a template note, if it is one
    pub async fn expand_template(
        &self,
        canvas_id: &CanvasId,
        node_id: &NodeId,
    ) -> ChatResult<Option<String>> {
        let canvas = self.registry.snapshot(canvas_id)?;
        if canvas.get_node(node_id).is_none() {
            return Err(ChatError::NodeNotFound(node_id.to_string()));
        }
        Ok(template::expand(&canvas, node_id, self.resolver.as_ref()).await)
    }

    // --- Generate ---

    /// Assemble and send to `client`
    ///
    /// The client is not called when the assembly is empty.
    pub async fn complete(
        &self,
        canvas_id: &CanvasId,
        node_id: &NodeId,
        client: &dyn CompletionClient,
    ) -> ChatResult<Option<String>> {
        let Some(request) = self.request(canvas_id, node_id).await? else {
            return Ok(None);
        };
        info!(
            model = %request.model,
            notes = request.messages.len(),
            tokens = request.budget_used,
            "sending conversation"
        );
        Ok(client.complete(&request).await?)
    }
}
