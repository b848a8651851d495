//! Completion client contract
//!
//! The crate stops at the request: transports (HTTP, local model, test
//! double) implement [`CompletionClient`]. `MockCompletionClient` records
//! requests and returns canned responses.

use crate::assemble::{Assembly, Message};
use crate::config::ChatConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Body of a chat completion call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
    pub temperature: f32,
    /// Input budget spent on `messages`; not part of the wire body
    #[serde(skip)]
    pub budget_used: usize,
}

impl CompletionRequest {
    /// Build a request from an assembly. Returns `None` for an empty one.
    pub fn from_assembly(assembly: &Assembly, config: &ChatConfig) -> Option<Self> {
        if assembly.is_empty() {
            return None;
        }
        Some(Self {
            model: config.model.clone(),
            messages: assembly.messages.clone(),
            max_tokens: (config.max_response_tokens > 0).then_some(config.max_response_tokens),
            temperature: config.temperature,
            budget_used: assembly.budget_used,
        })
    }
}

/// Errors from completion client operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompletionError {
    #[error("completion endpoint not available: {0}")]
    Unavailable(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
}

/// Client trait for chat completion endpoints.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the request. `Ok(None)` means the endpoint answered with
    /// nothing usable.
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Option<String>, CompletionError>;
}

/// Mock client for testing: returns a preconfigured response.
pub struct MockCompletionClient {
    response: Result<Option<String>, CompletionError>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionClient {
    /// Create a mock that answers every request with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            response: Ok(Some(text.into())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that answers with an empty response.
    pub fn silent() -> Self {
        Self {
            response: Ok(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that fails every request.
    pub fn failing(error: CompletionError) -> Self {
        Self {
            response: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Option<String>, CompletionError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.response.clone()
    }
}
