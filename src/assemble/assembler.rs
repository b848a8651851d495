//! The message assembler: traversal + resolution + budget

use super::{is_system_prompt, parse_system_prompt, Assembly, Message, Role};
use crate::budget::{BudgetAccountant, CharEstimate, TokenCounter};
use crate::config::DEFAULT_SYSTEM_PROMPT;
use crate::graph::{Canvas, CanvasNode, NodeId};
use crate::query::{AncestorTraversal, AncestorVisitor, CancellationToken, Visit};
use crate::resolve::ContentResolver;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Knobs the assembler consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Ancestor levels to include (0 = unlimited)
    pub max_depth: usize,
    /// Total budget in units, system prompt included
    pub token_budget: usize,
    /// Used when no root note overrides it; empty means no system message
    pub system_prompt: String,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            max_depth: 0,
            token_budget: 4096,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Builds chat messages from a note's ancestry
///
/// Runs two traversals over the same snapshot. The first resolves only
/// graph roots, looking for a system prompt override, so the prompt can be
/// charged before any ancestor. The second resolves every visited note and
/// spends the budget. Each note is resolved at most once per call.
#[derive(Clone)]
pub struct MessageAssembler {
    resolver: Arc<dyn ContentResolver>,
    counter: Arc<dyn TokenCounter>,
    options: AssemblyOptions,
    cancel: Option<CancellationToken>,
}

impl MessageAssembler {
    pub fn new(resolver: Arc<dyn ContentResolver>, options: AssemblyOptions) -> Self {
        Self {
            resolver,
            counter: Arc::new(CharEstimate::default()),
            options,
            cancel: None,
        }
    }

    /// Replace the default character-based token estimate
    pub fn with_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.counter = counter;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn traversal(&self, start: &NodeId) -> AncestorTraversal {
        let traversal = AncestorTraversal::from(start.clone()).depth(self.options.max_depth);
        match &self.cancel {
            Some(token) => traversal.with_cancellation(token.clone()),
            None => traversal,
        }
    }

    /// Assemble the conversation ending at `start`
    ///
    /// Never fails: unreadable notes count as blank, and an empty
    /// [`Assembly`] means there is nothing worth sending.
    pub async fn assemble(&self, canvas: &Canvas, start: &NodeId) -> Assembly {
        let traversal = self.traversal(start);
        let mut texts = TextCache::new(self.resolver.clone());

        let mut discovery = PromptDiscovery {
            texts: &mut texts,
            found: None,
        };
        if traversal.execute(canvas, &mut discovery).await.cancelled {
            return Assembly::cancelled();
        }
        let system_override = discovery.found;

        let system_prompt = match &system_override {
            Some((_, prompt)) => prompt.clone(),
            None => self.options.system_prompt.trim().to_string(),
        };

        let mut budget = BudgetAccountant::new(self.counter.clone(), self.options.token_budget);
        if !system_prompt.is_empty() {
            let cost = budget.cost(&system_prompt);
            if !budget.fits(cost) {
                debug!(limit = budget.limit(), cost, "system prompt alone exceeds the budget");
            }
            budget.charge(cost);
        }

        let mut collector = Collector {
            texts: &mut texts,
            budget,
            collected: Vec::new(),
            exhausted: false,
        };
        let report = traversal.execute(canvas, &mut collector).await;
        if report.cancelled {
            return Assembly::cancelled();
        }

        if collector.collected.is_empty() {
            debug!(start = %start, visited = report.visited.len(), "no content to send");
            return Assembly::default();
        }

        let mut messages = Vec::with_capacity(collector.collected.len() + 1);
        if !system_prompt.is_empty() {
            messages.push(Message::new(Role::System, system_prompt));
        }
        messages.extend(collector.collected.into_iter().rev());

        Assembly {
            messages,
            budget_used: collector.budget.used(),
            truncated: collector.exhausted,
            system_override: system_override.map(|(id, _)| id),
            cancelled: false,
        }
    }
}

/// Resolves each node once and remembers the trimmed text
struct TextCache {
    resolver: Arc<dyn ContentResolver>,
    texts: HashMap<NodeId, String>,
}

impl TextCache {
    fn new(resolver: Arc<dyn ContentResolver>) -> Self {
        Self {
            resolver,
            texts: HashMap::new(),
        }
    }

    async fn text(&mut self, node: &CanvasNode) -> String {
        if let Some(text) = self.texts.get(&node.id) {
            return text.clone();
        }
        let text = match self.resolver.resolve(node).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(node = %node.id, error = %e, "could not resolve note content");
                String::new()
            }
        };
        self.texts.insert(node.id.clone(), text.clone());
        text
    }
}

/// First pass: find the first root carrying the marker
struct PromptDiscovery<'c> {
    texts: &'c mut TextCache,
    found: Option<(NodeId, String)>,
}

#[async_trait]
impl<'c> AncestorVisitor for PromptDiscovery<'c> {
    async fn visit(&mut self, visit: &Visit<'_>) -> bool {
        if self.found.is_none() && visit.is_root() {
            let text = self.texts.text(visit.node).await;
            if let Some(prompt) = parse_system_prompt(&text) {
                debug!(node = %visit.node.id, "system prompt override");
                self.found = Some((visit.node.id.clone(), prompt.to_string()));
            }
        }
        true
    }
}

/// Second pass: collect messages newest-first while spending the budget
struct Collector<'c> {
    texts: &'c mut TextCache,
    budget: BudgetAccountant,
    collected: Vec<Message>,
    exhausted: bool,
}

#[async_trait]
impl<'c> AncestorVisitor for Collector<'c> {
    async fn visit(&mut self, visit: &Visit<'_>) -> bool {
        // The budget is shared by every branch
        if self.exhausted {
            return false;
        }

        let node = visit.node;
        let text = self.texts.text(node).await;
        if text.is_empty() {
            return true;
        }
        if visit.is_root() && is_system_prompt(&text) {
            return false;
        }

        let role = Role::from(node.role());
        let cost = self.budget.cost(&text);
        if self.budget.fits(cost) {
            debug!(node = %node.id, depth = visit.depth, cost, "adding note");
            self.budget.charge(cost);
            self.collected.push(Message::new(role, text));
            return true;
        }

        let remaining = self.budget.remaining();
        let (kept, used) = self.budget.truncate_to_fit(&text, remaining);
        debug!(
            node = %node.id,
            depth = visit.depth,
            from = text.chars().count(),
            to = kept.chars().count(),
            "truncating note to fit budget"
        );
        self.budget.charge(used);
        if !kept.is_empty() {
            self.collected.push(Message::new(role, kept));
        }
        self.exhausted = true;
        false
    }
}
