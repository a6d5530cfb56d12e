// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider validator for deterministic testing.
//!
//! `MockValidator` implements `ProviderValidator` with a fixed outcome and
//! a call counter, enabling orchestrator tests without live provider APIs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use keyfort_core::{ProviderValidator, ValidationOutcome};

/// A mock validator that always returns a pre-configured outcome.
pub struct MockValidator {
    platform: &'static str,
    outcome: ValidationOutcome,
    calls: AtomicUsize,
}

impl MockValidator {
    /// Create a mock validator for `platform` that returns `outcome`.
    pub fn new(platform: &'static str, outcome: ValidationOutcome) -> Arc<Self> {
        Arc::new(Self {
            platform,
            outcome,
            calls: AtomicUsize::new(0),
        })
    }

    /// Shorthand for a validator that reports every key as valid.
    pub fn valid(platform: &'static str) -> Arc<Self> {
        Self::new(platform, ValidationOutcome::Valid)
    }

    /// Shorthand for a validator that reports every key as invalid.
    pub fn invalid(platform: &'static str, message: &str) -> Arc<Self> {
        Self::new(
            platform,
            ValidationOutcome::Invalid {
                message: message.to_string(),
            },
        )
    }

    /// How many times `validate` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderValidator for MockValidator {
    fn platform(&self) -> &'static str {
        self.platform
    }

    async fn validate(&self, _secret: &str) -> ValidationOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_configured_outcome_and_counts_calls() {
        let validator = MockValidator::invalid("Anthropic", "Неверный API ключ");
        assert_eq!(validator.call_count(), 0);

        let outcome = validator.validate("sk-any").await;
        assert_eq!(
            outcome,
            ValidationOutcome::Invalid {
                message: "Неверный API ключ".to_string()
            }
        );
        assert_eq!(validator.call_count(), 1);
    }
}
