//! Known chat models and their context windows

/// A chat model and the number of tokens it accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelLimit {
    pub name: &'static str,
    pub token_limit: usize,
}

pub const CHAT_MODELS: &[ModelLimit] = &[
    ModelLimit {
        name: "gpt-3.5-turbo",
        token_limit: 4096,
    },
    ModelLimit {
        name: "gpt-3.5-turbo-16k",
        token_limit: 16384,
    },
    ModelLimit {
        name: "gpt-4",
        token_limit: 8000,
    },
    ModelLimit {
        name: "gpt-4-32k",
        token_limit: 32768,
    },
];

/// Look up a model by exact name
pub fn model_by_name(name: &str) -> Option<&'static ModelLimit> {
    CHAT_MODELS.iter().find(|m| m.name == name)
}

/// Budget for one assembly: the configured budget, capped by the model's
/// context window when the model is known
pub fn effective_budget(token_budget: usize, model: &str) -> usize {
    match model_by_name(model) {
        Some(model) => token_budget.min(model.token_limit),
        None => token_budget,
    }
}
