//! Token budget accounting
//!
//! Text is made commensurable with a numeric budget through a
//! [`TokenCounter`]. The [`BudgetAccountant`] keeps the running total for
//! one assembly and truncates text from the front when it would overflow,
//! so the end of a note (closest to the current thought) survives.

mod models;

pub use models::{effective_budget, model_by_name, ModelLimit, CHAT_MODELS};

use std::sync::Arc;

/// Converts text into budget units
///
/// Implementations must be deterministic and monotonic: a suffix of a text
/// never costs more than the text itself, and the empty string costs zero.
pub trait TokenCounter: Send + Sync + std::fmt::Debug {
    fn count(&self, text: &str) -> usize;
}

/// Character-ratio approximation of a subword tokenizer
///
/// `ceil(chars / chars_per_token)`, counting Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharEstimate {
    chars_per_token: usize,
}

impl CharEstimate {
    pub const DEFAULT_CHARS_PER_TOKEN: usize = 3;

    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }

    pub fn chars_per_token(&self) -> usize {
        self.chars_per_token
    }
}

impl Default for CharEstimate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHARS_PER_TOKEN)
    }
}

impl TokenCounter for CharEstimate {
    fn count(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token)
    }
}

/// Running budget for a single assembly
#[derive(Debug, Clone)]
pub struct BudgetAccountant {
    counter: Arc<dyn TokenCounter>,
    limit: usize,
    used: usize,
}

impl BudgetAccountant {
    pub fn new(counter: Arc<dyn TokenCounter>, limit: usize) -> Self {
        Self {
            counter,
            limit,
            used: 0,
        }
    }

    /// Accountant using the default [`CharEstimate`]
    pub fn with_char_estimate(limit: usize) -> Self {
        Self::new(Arc::new(CharEstimate::default()), limit)
    }

    /// Cost of `text` in budget units
    pub fn cost(&self, text: &str) -> usize {
        self.counter.count(text)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.used)
    }

    /// Whether `units` more would still be within the limit
    pub fn fits(&self, units: usize) -> bool {
        self.used.saturating_add(units) <= self.limit
    }

    /// Add `units` to the running total
    pub fn charge(&mut self, units: usize) {
        self.used = self.used.saturating_add(units);
    }

    /// Drop characters from the front of `text` until it costs at most
    /// `remaining` units
    ///
    /// Returns the kept tail and its cost. Cuts only on char boundaries.
    pub fn truncate_to_fit(&self, text: &str, remaining: usize) -> (String, usize) {
        let full = self.cost(text);
        if full <= remaining {
            return (text.to_string(), full);
        }

        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();

        // offsets[0] is known to overflow and the empty tail always fits;
        // find the first char offset whose tail fits.
        let (mut lo, mut hi) = (0usize, offsets.len() - 1);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.cost(&text[offsets[mid]..]) <= remaining {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let tail = &text[offsets[hi]..];
        (tail.to_string(), self.cost(tail))
    }
}
