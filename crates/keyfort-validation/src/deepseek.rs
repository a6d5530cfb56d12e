// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! API key validator for the DeepSeek Chat Completions API.

use async_trait::async_trait;
use keyfort_config::ValidationConfig;
use keyfort_core::{KeyfortError, ProviderValidator, ValidationOutcome};
use tracing::debug;

use crate::messages;

const API_BASE_URL: &str = "https://api.deepseek.com";
const PROBE_MODEL: &str = "deepseek-chat";

/// Validates DeepSeek API keys with a one-token, non-streaming chat
/// completion request.
#[derive(Debug, Clone)]
pub struct DeepSeekValidator {
    client: reqwest::Client,
    base_url: String,
}

impl DeepSeekValidator {
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
impl ProviderValidator for DeepSeekValidator {
    fn platform(&self) -> &'static str {
        "DeepSeek"
    }

    async fn validate(&self, secret: &str) -> ValidationOutcome {
        let body = serde_json::json!({
            "model": PROBE_MODEL,
            "max_tokens": 1,
            "messages": [{"role": "user", "content": "Hi"}],
            "stream": false,
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
        debug!(status, "deepseek validation response");

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

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_validator(base_url: &str) -> DeepSeekValidator {
        let config = ValidationConfig {
            connect_timeout_secs: 1,
            read_timeout_secs: 1,
        };
        DeepSeekValidator::new(&config)
            .unwrap()
            .with_base_url(base_url.to_string())
    }

    #[tokio::test]
    async fn ok_response_is_valid_with_minimal_probe_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-good"))
            .and(body_partial_json(serde_json::json!({
                "model": "deepseek-chat",
                "max_tokens": 1,
                "stream": false,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "probe", "object": "chat.completion"
            })))
            .mount(&server)
            .await;

        let outcome = test_validator(&server.uri()).validate("sk-good").await;
        assert_eq!(outcome, ValidationOutcome::Valid);
    }

    #[tokio::test]
    async fn auth_failures_map_to_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let outcome = test_validator(&server.uri()).validate("sk-bad").await;
        assert_eq!(
            outcome,
            ValidationOutcome::Invalid {
                message: "Неверный API ключ".to_string()
            }
        );
    }

    #[tokio::test]
    async fn blocked_key_maps_to_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let outcome = test_validator(&server.uri()).validate("sk-blocked").await;
        assert_eq!(
            outcome,
            ValidationOutcome::Invalid {
                message: "Ключ заблокирован".to_string()
            }
        );
    }

    #[tokio::test]
    async fn rate_limited_still_counts_as_valid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let outcome = test_validator(&server.uri()).validate("sk-throttled").await;
        assert_eq!(outcome, ValidationOutcome::Valid);
    }

    #[tokio::test]
    async fn server_errors_are_server_error() {
        for status in [500u16, 502, 503] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;

            let outcome = test_validator(&server.uri()).validate("sk-any").await;
            assert_eq!(
                outcome,
                ValidationOutcome::ServerError {
                    message: "Сервер недоступен".to_string()
                },
                "status {status}"
            );
        }
    }

    #[tokio::test]
    async fn read_timeout_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(1500)),
            )
            .mount(&server)
            .await;

        let outcome = test_validator(&server.uri()).validate("sk-any").await;
        assert_eq!(
            outcome,
            ValidationOutcome::NetworkError {
                message: "Превышено время ожидания".to_string()
            }
        );
    }
}
