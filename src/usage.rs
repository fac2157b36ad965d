//! Token usage accounting across the LLM calls of one worker session.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Token counters reported by a model provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    #[serde(default)]
    pub cache_read_tokens: u64,
    #[serde(default)]
    pub cache_write_tokens: u64,
}

impl TokenUsage {
    /// Add another call's usage to this running total; counters saturate at `u64::MAX`
    pub fn merge(&mut self, other: &TokenUsage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(other.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
        self.cache_read_tokens = self.cache_read_tokens.saturating_add(other.cache_read_tokens);
        self.cache_write_tokens = self.cache_write_tokens.saturating_add(other.cache_write_tokens);
    }

    /// Providers may omit usage entirely; that leaves the total unchanged.
    pub fn merge_optional(&mut self, other: Option<&TokenUsage>) {
        if let Some(other) = other {
            self.merge(other);
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TokenUsage::default()
    }
}

impl AddAssign<&TokenUsage> for TokenUsage {
    fn add_assign(&mut self, other: &TokenUsage) {
        self.merge(other);
    }
}

impl<'a> std::iter::Sum<&'a TokenUsage> for TokenUsage {
    fn sum<I: Iterator<Item = &'a TokenUsage>>(iter: I) -> Self {
        let mut total = TokenUsage::default();
        for usage in iter {
            total.merge(usage);
        }
        total
    }
}
