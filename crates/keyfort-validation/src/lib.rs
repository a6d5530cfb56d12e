// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider API key validators for the Keyfort credential vault.
//!
//! One adapter per provider, each issuing a single minimal, low-cost
//! request that exercises authentication and classifying the response into
//! a [`keyfort_core::ValidationOutcome`]. The [`ValidationDispatcher`]
//! routes a platform name to its validator through a fixed allow-list.
//!
//! Validators are infallible at their boundary: transport failures,
//! unparseable bodies, and unrecognized status codes all resolve to an
//! outcome variant, never an `Err` or a panic.

pub mod anthropic;
pub mod deepseek;
pub mod dispatch;
pub mod gemini;
pub mod hailuo;
pub mod messages;
pub mod openai;

use std::time::Duration;

use keyfort_config::ValidationConfig;
use keyfort_core::{KeyfortError, ValidationOutcome};
use serde::Deserialize;

pub use anthropic::AnthropicValidator;
pub use deepseek::DeepSeekValidator;
pub use dispatch::{ValidationDispatcher, SUPPORTED_PLATFORMS};
pub use gemini::GeminiValidator;
pub use hailuo::HailuoValidator;
pub use openai::OpenAiValidator;

/// Build the HTTP client shared by a validator, with bounded connect and
/// read timeouts so a validation attempt can never hang indefinitely.
pub(crate) fn build_client(config: &ValidationConfig) -> Result<reqwest::Client, KeyfortError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.read_timeout_secs))
        .build()
        .map_err(|e| KeyfortError::Internal(format!("failed to build HTTP client: {e}")))
}

/// Classify a transport-level failure into a [`ValidationOutcome`].
///
/// Timeouts and connect/DNS failures get fixed user-facing messages; any
/// other reqwest error carries its description.
pub(crate) fn transport_outcome(err: &reqwest::Error) -> ValidationOutcome {
    if err.is_timeout() {
        ValidationOutcome::NetworkError {
            message: messages::TIMEOUT.to_string(),
        }
    } else if err.is_connect() {
        ValidationOutcome::NetworkError {
            message: messages::NO_CONNECTION.to_string(),
        }
    } else {
        ValidationOutcome::NetworkError {
            message: format!("{}{err}", messages::NETWORK_ERROR_PREFIX),
        }
    }
}

/// Standard `{"error": {"message": ...}}` envelope used by the OpenAI-style
/// providers (and Anthropic/Gemini error bodies).
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Try to pull a human-readable `error.message` out of a JSON error body.
///
/// Returns `None` when the body is not JSON, has no error envelope, or the
/// message is blank.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed: ApiErrorBody = serde_json::from_str(body).ok()?;
    let message = parsed.error.message.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

/// Fallback classification for a status code none of the provider's known
/// arms matched: prefer the body's `error.message`, else a generic server
/// error carrying the code.
pub(crate) fn unrecognized_status_outcome(status: u16, body: &str) -> ValidationOutcome {
    match extract_error_message(body) {
        Some(message) => ValidationOutcome::Invalid { message },
        None => ValidationOutcome::ServerError {
            message: format!("{}{status}", messages::ERROR_CODE_PREFIX),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_error_message_reads_envelope() {
        let body = r#"{"error": {"type": "invalid_request_error", "message": "Bad model"}}"#;
        assert_eq!(extract_error_message(body), Some("Bad model".to_string()));
    }

    #[test]
    fn extract_error_message_rejects_blank_and_non_json() {
        assert_eq!(extract_error_message(r#"{"error": {"message": ""}}"#), None);
        assert_eq!(extract_error_message(r#"{"error": {}}"#), None);
        assert_eq!(extract_error_message("not json"), None);
        assert_eq!(extract_error_message(r#"{"detail": "no envelope"}"#), None);
    }

    #[test]
    fn unrecognized_status_prefers_body_message() {
        let with_message = unrecognized_status_outcome(
            418,
            r#"{"error": {"message": "teapot refuses"}}"#,
        );
        assert_eq!(
            with_message,
            ValidationOutcome::Invalid {
                message: "teapot refuses".to_string()
            }
        );

        let without = unrecognized_status_outcome(418, "");
        assert_eq!(
            without,
            ValidationOutcome::ServerError {
                message: "Код ошибки: 418".to_string()
            }
        );
    }
}
