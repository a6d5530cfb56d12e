// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! API key validator for the Hailuo (MiniMax) platform.
//!
//! MiniMax does not use HTTP status codes as the primary signal: responses
//! carry a `base_resp.status_code`/`status_msg` envelope that must be
//! classified first, with the HTTP status only as a fallback. The probe
//! requests a deliberately bogus file id -- "file not found" (1004) for
//! that id proves the credentials were accepted.

use async_trait::async_trait;
use keyfort_config::ValidationConfig;
use keyfort_core::{KeyfortError, ProviderValidator, ValidationOutcome};
use serde::Deserialize;
use tracing::debug;

use crate::messages;

const API_BASE_URL: &str = "https://api.minimax.io";
const GROUP_ID: &str = "1956997081382003480";
const PROBE_FILE_ID: &str = "test_invalid_id";

/// Substrings (lowercased) in `status_msg` that mark an auth failure,
/// including the ambiguous 1004 "login fail" case.
const AUTH_FAILURE_KEYWORDS: [&str; 5] = [
    "login fail",
    "invalid api",
    "authorization",
    "api key",
    "api secret",
];

/// MiniMax response envelope carried by every API response.
#[derive(Debug, Deserialize)]
struct BaseResp {
    #[serde(default = "missing_status_code")]
    status_code: i64,
    #[serde(default)]
    status_msg: String,
}

fn missing_status_code() -> i64 {
    -1
}

#[derive(Debug, Deserialize)]
struct FilesRetrieveResponse {
    base_resp: Option<BaseResp>,
}

/// Validates Hailuo (MiniMax) API keys against the files-retrieve endpoint.
#[derive(Debug, Clone)]
pub struct HailuoValidator {
    client: reqwest::Client,
    base_url: String,
}

impl HailuoValidator {
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
impl ProviderValidator for HailuoValidator {
    fn platform(&self) -> &'static str {
        "Hailuo"
    }

    async fn validate(&self, secret: &str) -> ValidationOutcome {
        let response = self
            .client
            .get(format!("{}/v1/files/retrieve", self.base_url))
            .query(&[("GroupId", GROUP_ID), ("file_id", PROBE_FILE_ID)])
            .bearer_auth(secret)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => return crate::transport_outcome(&e),
        };

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        debug!(status, "hailuo validation response");

        if let Some(outcome) = classify_envelope(&body) {
            return outcome;
        }

        // No usable envelope: fall back to the HTTP status code.
        match status {
            200..=299 => ValidationOutcome::Valid,
            400 => ValidationOutcome::Invalid {
                message: messages::BAD_REQUEST.to_string(),
            },
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
            other => ValidationOutcome::ServerError {
                message: format!("{}{other}", messages::ERROR_CODE_PREFIX),
            },
        }
    }
}

/// Classify the `base_resp` envelope, if the body carries one.
///
/// Returns `None` when the body is not JSON or has no envelope, in which
/// case the caller falls back to the HTTP status code. An envelope with an
/// unrecognized status code also falls through to the HTTP status.
fn classify_envelope(body: &str) -> Option<ValidationOutcome> {
    let parsed: FilesRetrieveResponse = serde_json::from_str(body).ok()?;
    let base_resp = parsed.base_resp?;

    let msg_lower = base_resp.status_msg.to_lowercase();
    let is_auth_error = AUTH_FAILURE_KEYWORDS
        .iter()
        .any(|keyword| msg_lower.contains(keyword));

    if is_auth_error {
        return Some(ValidationOutcome::Invalid {
            message: messages::INVALID_KEY.to_string(),
        });
    }

    match base_resp.status_code {
        // MiniMax auth-failure codes.
        1001 | 1002 | 2049 => Some(ValidationOutcome::Invalid {
            message: if base_resp.status_msg.trim().is_empty() {
                messages::INVALID_KEY.to_string()
            } else {
                base_resp.status_msg
            },
        }),
        // Success codes.
        0 | 2013 => Some(ValidationOutcome::Valid),
        // 1004 without auth keywords: "file not found" for the bogus probe
        // id, which means the request authenticated.
        1004 => Some(ValidationOutcome::Valid),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_validator(base_url: &str) -> HailuoValidator {
        let config = ValidationConfig {
            connect_timeout_secs: 1,
            read_timeout_secs: 1,
        };
        HailuoValidator::new(&config)
            .unwrap()
            .with_base_url(base_url.to_string())
    }

    fn envelope(status_code: i64, status_msg: &str) -> serde_json::Value {
        serde_json::json!({
            "base_resp": {"status_code": status_code, "status_msg": status_msg}
        })
    }

    #[tokio::test]
    async fn probe_targets_files_retrieve_with_bogus_file_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/files/retrieve"))
            .and(query_param("GroupId", "1956997081382003480"))
            .and(query_param("file_id", "test_invalid_id"))
            .and(header("authorization", "Bearer mm-good"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(0, "success")))
            .mount(&server)
            .await;

        let outcome = test_validator(&server.uri()).validate("mm-good").await;
        assert_eq!(outcome, ValidationOutcome::Valid);
    }

    #[tokio::test]
    async fn success_codes_are_valid() {
        for code in [0i64, 2013] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_json(envelope(code, "")))
                .mount(&server)
                .await;

            let outcome = test_validator(&server.uri()).validate("mm-any").await;
            assert_eq!(outcome, ValidationOutcome::Valid, "status_code {code}");
        }
    }

    #[tokio::test]
    async fn file_not_found_for_bogus_probe_is_valid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(1004, "file not found")),
            )
            .mount(&server)
            .await;

        let outcome = test_validator(&server.uri()).validate("mm-good").await;
        assert_eq!(outcome, ValidationOutcome::Valid);
    }

    #[tokio::test]
    async fn login_fail_1004_is_invalid_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(1004, "login fail")))
            .mount(&server)
            .await;

        let outcome = test_validator(&server.uri()).validate("mm-bad").await;
        assert_eq!(
            outcome,
            ValidationOutcome::Invalid {
                message: "Неверный API ключ".to_string()
            }
        );
    }

    #[tokio::test]
    async fn auth_error_codes_surface_status_msg() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(2049, "token expired")),
            )
            .mount(&server)
            .await;

        let outcome = test_validator(&server.uri()).validate("mm-expired").await;
        assert_eq!(
            outcome,
            ValidationOutcome::Invalid {
                message: "token expired".to_string()
            }
        );
    }

    #[tokio::test]
    async fn auth_error_codes_with_blank_msg_use_default_message() {
        for code in [1001i64, 1002] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_json(envelope(code, "")))
                .mount(&server)
                .await;

            let outcome = test_validator(&server.uri()).validate("mm-bad").await;
            assert_eq!(
                outcome,
                ValidationOutcome::Invalid {
                    message: "Неверный API ключ".to_string()
                },
                "status_code {code}"
            );
        }
    }

    #[tokio::test]
    async fn auth_keyword_overrides_success_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope(0, "invalid api key provided")),
            )
            .mount(&server)
            .await;

        let outcome = test_validator(&server.uri()).validate("mm-bad").await;
        assert_eq!(
            outcome,
            ValidationOutcome::Invalid {
                message: "Неверный API ключ".to_string()
            }
        );
    }

    #[tokio::test]
    async fn missing_envelope_falls_back_to_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let outcome = test_validator(&server.uri()).validate("mm-bad").await;
        assert_eq!(
            outcome,
            ValidationOutcome::Invalid {
                message: "Неверный API ключ".to_string()
            }
        );
    }

    #[tokio::test]
    async fn unrecognized_envelope_code_falls_back_to_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(1027, "content moderation")),
            )
            .mount(&server)
            .await;

        // Unknown envelope code over a 2xx response: valid by HTTP fallback.
        let outcome = test_validator(&server.uri()).validate("mm-any").await;
        assert_eq!(outcome, ValidationOutcome::Valid);
    }

    #[tokio::test]
    async fn server_errors_are_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let outcome = test_validator(&server.uri()).validate("mm-any").await;
        assert_eq!(
            outcome,
            ValidationOutcome::ServerError {
                message: "Сервер недоступен".to_string()
            }
        );
    }

    #[tokio::test]
    async fn read_timeout_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(1500)),
            )
            .mount(&server)
            .await;

        let outcome = test_validator(&server.uri()).validate("mm-any").await;
        assert_eq!(
            outcome,
            ValidationOutcome::NetworkError {
                message: "Превышено время ожидания".to_string()
            }
        );
    }
}
