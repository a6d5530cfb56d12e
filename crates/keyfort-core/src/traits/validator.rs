// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider validator trait for API key validation adapters.

use async_trait::async_trait;

use crate::types::ValidationOutcome;

/// Adapter that validates an API key against one provider's live API.
///
/// Implementations issue exactly one minimal, low-cost request that
/// exercises authentication, then classify the response. `validate` is
/// infallible by contract: every transport or protocol failure inside the
/// adapter resolves to a [`ValidationOutcome`] variant, never an error or
/// a panic.
#[async_trait]
pub trait ProviderValidator: Send + Sync {
    /// The exact, case-sensitive platform name this validator serves.
    fn platform(&self) -> &'static str;

    /// Validate `secret` against the provider and classify the response.
    async fn validate(&self, secret: &str) -> ValidationOutcome;
}
