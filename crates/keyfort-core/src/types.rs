// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Keyfort workspace.

use serde::{Deserialize, Serialize};

/// Platforms that ship with the vault and always logically exist.
///
/// A default platform row is never garbage-collected when its last key is
/// deleted; it is recreated on demand the next time a key is saved under
/// its name. Custom platforms with zero keys are eligible for cleanup.
pub const DEFAULT_PLATFORMS: [&str; 8] = [
    "Anthropic",
    "OpenAI",
    "Gemini",
    "Hailuo",
    "DeepSeek",
    "Reve AI",
    "GitHub",
    "Google Image Search",
];

/// Returns true if `name` is one of the built-in default platforms.
///
/// The comparison is exact and case-sensitive, matching how platform rows
/// are resolved everywhere else.
pub fn is_default_platform(name: &str) -> bool {
    DEFAULT_PLATFORMS.contains(&name)
}

/// A platform (service) that API keys belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Surrogate row id.
    pub id: i64,
    /// Unique, case-sensitive display name.
    pub name: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// Optional user-supplied icon payload (base64), opaque to the core.
    pub custom_icon: Option<String>,
}

impl Platform {
    /// Whether this platform is one of the built-in defaults.
    pub fn is_default(&self) -> bool {
        is_default_platform(&self.name)
    }
}

/// Metadata record for a stored API key.
///
/// The secret value itself never lives here -- it is held by the encrypted
/// secret store, addressed solely through `secret_ref`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    /// Surrogate row id.
    pub id: i64,
    /// User-chosen display name.
    pub display_name: String,
    /// Opaque secret-store reference (UUIDv4), unique across all records.
    pub secret_ref: String,
    /// Owning platform row id.
    pub platform_id: i64,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// Last known validation result. Set at creation, reset to false when
    /// the underlying secret value changes during an edit.
    pub is_valid: bool,
    /// Optional free-text note.
    pub note: Option<String>,
}

/// Normalized result of validating an API key against its provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The key authenticated successfully (includes rate-limited 429
    /// responses -- throttled, but authenticated).
    Valid,
    /// The key is definitively wrong or blocked. Safe to reject.
    Invalid { message: String },
    /// Provider-side failure. Key status unknown, must not be treated as
    /// invalid.
    ServerError { message: String },
    /// Local connectivity failure (DNS, connect, timeout). Key status
    /// unknown.
    NetworkError { message: String },
}

impl ValidationOutcome {
    /// Whether this outcome proves the key authenticated.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }
}

/// Result of scanning the secret store for an already-stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateCheck {
    /// No stored secret matches the candidate value.
    NotDuplicate,
    /// The candidate value is already stored under an existing record.
    Duplicate {
        existing: ApiKeyRecord,
        platform_name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_platforms_are_exactly_eight() {
        assert_eq!(DEFAULT_PLATFORMS.len(), 8);
        assert!(is_default_platform("Anthropic"));
        assert!(is_default_platform("Google Image Search"));
        assert!(!is_default_platform("CustomTool"));
    }

    #[test]
    fn default_platform_check_is_case_sensitive() {
        assert!(is_default_platform("OpenAI"));
        assert!(!is_default_platform("openai"));
        assert!(!is_default_platform("OPENAI"));
    }

    #[test]
    fn validation_outcome_is_valid_only_for_valid() {
        assert!(ValidationOutcome::Valid.is_valid());
        assert!(
            !ValidationOutcome::Invalid {
                message: "x".into()
            }
            .is_valid()
        );
        assert!(
            !ValidationOutcome::ServerError {
                message: "x".into()
            }
            .is_valid()
        );
        assert!(
            !ValidationOutcome::NetworkError {
                message: "x".into()
            }
            .is_valid()
        );
    }

    #[test]
    fn api_key_record_serializes_without_secret_value() {
        let record = ApiKeyRecord {
            id: 1,
            display_name: "work key".into(),
            secret_ref: "ref-1".into(),
            platform_id: 2,
            created_at: "2026-01-01T00:00:00Z".into(),
            is_valid: true,
            note: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        // Only the opaque reference appears, never a value field.
        assert!(json.contains("secret_ref"));
        assert!(!json.contains("secret_value"));
    }
}
