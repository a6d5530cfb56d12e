// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! API key validator for the OpenAI Chat Completions API.

use async_trait::async_trait;
use keyfort_config::ValidationConfig;
use keyfort_core::{KeyfortError, ProviderValidator, ValidationOutcome};
use tracing::debug;

use crate::messages;

const API_BASE_URL: &str = "https://api.openai.com";
const PROBE_MODEL: &str = "gpt-4o-mini";

/// Validates OpenAI API keys with a one-token chat completion request.
#[derive(Debug, Clone)]
pub struct OpenAiValidator {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiValidator {
    /// Creates a new validator with timeouts from `config`.
    pub fn new(config: &ValidationConfig) -> Result<Self, KeyfortError> {
        Ok(Self {
            client: crate::build_client(config)?,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }
}

#[async_trait]
impl ProviderValidator for OpenAiValidator {
    fn platform(&self) -> &'static str {
        "OpenAI"
    }

    async fn validate(&self, secret: &str) -> ValidationOutcome {
        let body = serde_json::json!({
            "model": PROBE_MODEL,
            "max_tokens": 1,
            "messages": [{"role": "user", "content": "Hi"}],
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(secret)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => return crate::transport_outcome(&e),
        };

        let status = response.status().as_u16();
        debug!(status, "openai validation response");

        match status {
            200 => ValidationOutcome::Valid,
            401 => ValidationOutcome::Invalid {
                message: messages::INVALID_KEY.to_string(),
            },
            403 => ValidationOutcome::Invalid {
                message: messages::KEY_BLOCKED.to_string(),
            },
            429 => ValidationOutcome::Valid,
            500 | 502 | 503 => ValidationOutcome::ServerError {
                message: messages::SERVER_UNAVAILABLE.to_string(),
            },
            other => {
                let body = response.text().await.unwrap_or_default();
                crate::unrecognized_status_outcome(other, &body)
            }
        }
    }
}
