// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Name-keyed dispatch of validation requests to provider validators.

use std::collections::HashMap;
use std::sync::Arc;

use keyfort_config::ValidationConfig;
use keyfort_core::{KeyfortError, ProviderValidator, ValidationOutcome};
use tracing::debug;

use crate::messages;
use crate::{
    AnthropicValidator, DeepSeekValidator, GeminiValidator, HailuoValidator, OpenAiValidator,
};

/// The fixed allow-list of platforms that support live validation.
///
/// Matching is exact and case-sensitive everywhere a platform name is
/// compared against this list.
pub const SUPPORTED_PLATFORMS: [&str; 5] = ["Anthropic", "DeepSeek", "Gemini", "OpenAI", "Hailuo"];

/// Routes a (platform name, key value) pair to the matching validator.
///
/// Platforms outside the allow-list are rejected at dispatch time with a
/// terminal `ServerError` -- no request is ever attempted for them.
pub struct ValidationDispatcher {
    validators: HashMap<&'static str, Arc<dyn ProviderValidator>>,
}

impl ValidationDispatcher {
    /// Build the dispatcher with the five real provider validators.
    pub fn new(config: &ValidationConfig) -> Result<Self, KeyfortError> {
        let validators: Vec<Arc<dyn ProviderValidator>> = vec![
            Arc::new(AnthropicValidator::new(config)?),
            Arc::new(DeepSeekValidator::new(config)?),
            Arc::new(GeminiValidator::new(config)?),
            Arc::new(OpenAiValidator::new(config)?),
            Arc::new(HailuoValidator::new(config)?),
        ];
        Ok(Self::with_validators(validators))
    }

    /// Build a dispatcher from explicit validators, keyed by their
    /// [`ProviderValidator::platform`] names. Used to inject mocks.
    pub fn with_validators(validators: Vec<Arc<dyn ProviderValidator>>) -> Self {
        let validators = validators
            .into_iter()
            .map(|validator| (validator.platform(), validator))
            .collect();
        Self { validators }
    }

    /// Whether `platform_name` has a validator (exact, case-sensitive).
    pub fn supports_validation(&self, platform_name: &str) -> bool {
        self.validators.contains_key(platform_name)
    }

    /// Validate `secret` against the platform's provider.
    ///
    /// Unknown platforms short-circuit without network activity.
    pub async fn validate_key(&self, platform_name: &str, secret: &str) -> ValidationOutcome {
        match self.validators.get(platform_name) {
            Some(validator) => {
                debug!(platform = %platform_name, "dispatching key validation");
                validator.validate(secret).await
            }
            None => ValidationOutcome::ServerError {
                message: messages::UNSUPPORTED_PLATFORM.to_string(),
            },
        }
    }
}
