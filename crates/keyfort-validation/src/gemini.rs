// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! API key validator for the Google Gemini generateContent API.
//!
//! Gemini authenticates through a `key` query parameter and reports a bad
//! key as HTTP 400, so the 400 arm must inspect the body text to tell a
//! bad key apart from a merely malformed request.

use async_trait::async_trait;
use keyfort_config::ValidationConfig;
use keyfort_core::{KeyfortError, ProviderValidator, ValidationOutcome};
use tracing::debug;

use crate::messages;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const PROBE_MODEL: &str = "gemini-2.0-flash";

/// Validates Gemini API keys with a one-output-token generateContent
/// request.
#[derive(Debug, Clone)]
pub struct GeminiValidator {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiValidator {
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
impl ProviderValidator for GeminiValidator {
    fn platform(&self) -> &'static str {
        "Gemini"
    }

    async fn validate(&self, secret: &str) -> ValidationOutcome {
        let body = serde_json::json!({
            "contents": [{"parts": [{"text": "Hi"}]}],
            "generationConfig": {"maxOutputTokens": 1},
        });

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{PROBE_MODEL}:generateContent",
                self.base_url
            ))
            .query(&[("key", secret)])
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => return crate::transport_outcome(&e),
        };

        let status = response.status().as_u16();
        debug!(status, "gemini validation response");

        match status {
            200 => ValidationOutcome::Valid,
            400 => {
                let body = response.text().await.unwrap_or_default();
                classify_bad_request(&body)
            }
            401 | 403 => ValidationOutcome::Invalid {
                message: messages::INVALID_KEY.to_string(),
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

/// Disambiguate Gemini's 400 responses by message text.
///
/// A message mentioning "API key" means the key itself was rejected. Any
/// other non-blank message is surfaced as-is; a missing message falls back
/// to the generic bad-request wording.
fn classify_bad_request(body: &str) -> ValidationOutcome {
    match crate::extract_error_message(body) {
        Some(message) if message.to_lowercase().contains("api key") => {
            ValidationOutcome::Invalid {
                message: messages::INVALID_KEY.to_string(),
            }
        }
        Some(message) => ValidationOutcome::Invalid { message },
        None => ValidationOutcome::Invalid {
            message: messages::BAD_REQUEST.to_string(),
        },
    }
}
