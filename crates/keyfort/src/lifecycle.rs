// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key lifecycle orchestration: create, edit, delete, reveal, revalidate.
//!
//! Every save flow runs its stages strictly in sequence -- duplicate check,
//! then optional validation, then persistence -- because each stage's
//! outcome gates the next. All methods are plain `async fn`s and cancel-safe
//! at every await: dropping a save future after the secret write but before
//! the metadata insert leaves an orphaned secret entry, which stays
//! invisible and harmless.

use std::sync::Arc;

use keyfort_core::{
    ApiKeyRecord, DuplicateCheck, KeyfortError, Platform, SecretStore, ValidationOutcome,
};
use keyfort_storage::queries;
use keyfort_storage::Database;
use keyfort_validation::ValidationDispatcher;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};
use uuid::Uuid;

use crate::duplicate::DuplicateDetector;

const NAME_REQUIRED: &str = "Введите название ключа";
const VALUE_REQUIRED: &str = "Введите значение ключа";
const PLATFORM_REQUIRED: &str = "Выберите или введите название платформы";

/// Input for saving a brand-new key.
#[derive(Debug, Clone)]
pub struct NewKeyRequest {
    pub display_name: String,
    pub secret_value: String,
    pub platform_name: String,
    /// Icon payload carried onto the platform row if it gets created.
    pub custom_icon: Option<String>,
    pub note: Option<String>,
    /// Session-level "validation already failed, save anyway" flag: set by
    /// the caller when re-submitting after a failed validation attempt, so
    /// the key is stored with `is_valid = false` and no further request is
    /// made.
    pub validation_already_failed: bool,
}

/// Input for editing an existing key.
#[derive(Debug, Clone)]
pub struct UpdateKeyRequest {
    pub key_id: i64,
    pub display_name: String,
    pub secret_value: String,
    pub platform_name: String,
    pub custom_icon: Option<String>,
    pub note: Option<String>,
}

/// Terminal outcome of a new-key save flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The key was persisted.
    Saved { record: ApiKeyRecord },
    /// The value is already stored under an existing record; nothing was
    /// validated or persisted. The caller should clear the candidate value
    /// from its transient state before re-prompting.
    Duplicate {
        existing: ApiKeyRecord,
        platform_name: String,
    },
    /// Validation did not confirm the key; nothing was persisted. The
    /// caller may re-submit with `validation_already_failed` set to store
    /// the key anyway with `is_valid = false`.
    ValidationFailed { outcome: ValidationOutcome },
}

/// Coordinates the secret store, metadata store, duplicate detector, and
/// validation dispatcher for every user-initiated key action.
///
/// Handles are injected at construction; there is no ambient global state.
pub struct KeyLifecycle {
    db: Database,
    secrets: Arc<dyn SecretStore>,
    dispatcher: ValidationDispatcher,
    detector: DuplicateDetector,
}

impl KeyLifecycle {
    pub fn new(
        db: Database,
        secrets: Arc<dyn SecretStore>,
        dispatcher: ValidationDispatcher,
    ) -> Self {
        let detector = DuplicateDetector::new(db.clone(), secrets.clone());
        Self {
            db,
            secrets,
            dispatcher,
            detector,
        }
    }

    /// Whether `platform_name` supports live validation.
    pub fn supports_validation(&self, platform_name: &str) -> bool {
        self.dispatcher.supports_validation(platform_name)
    }

    /// Validate a key value against a platform's provider.
    pub async fn validate_key(&self, platform_name: &str, secret: &str) -> ValidationOutcome {
        self.dispatcher.validate_key(platform_name, secret).await
    }

    /// Scan the secret store for `candidate`, optionally skipping one
    /// reference (used during edits).
    pub async fn check_for_duplicate(
        &self,
        candidate: &str,
        exclude_reference: Option<&str>,
    ) -> Result<DuplicateCheck, KeyfortError> {
        self.detector
            .check_for_duplicate(candidate, exclude_reference)
            .await
    }

    /// Save a new key: duplicate check, optional validation, persistence.
    ///
    /// Stage order is load-bearing: persistence never happens after a
    /// duplicate hit, and no network request is made for duplicates,
    /// unsupported platforms, or re-submissions after a failed validation.
    pub async fn save_new_key(&self, request: NewKeyRequest) -> Result<SaveOutcome, KeyfortError> {
        validate_required_fields(
            &request.display_name,
            &request.secret_value,
            &request.platform_name,
        )?;

        match self
            .detector
            .check_for_duplicate(&request.secret_value, None)
            .await?
        {
            DuplicateCheck::Duplicate {
                existing,
                platform_name,
            } => {
                info!(existing_id = existing.id, "rejected duplicate key value");
                return Ok(SaveOutcome::Duplicate {
                    existing,
                    platform_name,
                });
            }
            DuplicateCheck::NotDuplicate => {}
        }

        let mut is_valid = false;
        if !request.validation_already_failed
            && self.dispatcher.supports_validation(&request.platform_name)
        {
            let outcome = self
                .dispatcher
                .validate_key(&request.platform_name, &request.secret_value)
                .await;
            if outcome.is_valid() {
                is_valid = true;
            } else {
                // Not a hard failure: transient provider or network trouble
                // must never lock a user out of storing a key. The caller
                // decides whether to re-submit and save unvalidated.
                return Ok(SaveOutcome::ValidationFailed { outcome });
            }
        }

        let record = self.persist_new_key(&request, is_valid).await?;
        Ok(SaveOutcome::Saved { record })
    }

    /// Edit an existing key's value and metadata.
    ///
    /// An unchanged secret value keeps the record's `is_valid` flag; a
    /// changed value is re-encrypted in place and resets the flag to false
    /// (the user re-validates explicitly). No duplicate check runs here.
    pub async fn update_key(
        &self,
        request: UpdateKeyRequest,
    ) -> Result<ApiKeyRecord, KeyfortError> {
        validate_required_fields(
            &request.display_name,
            &request.secret_value,
            &request.platform_name,
        )?;

        let existing = queries::keys::get_key_by_id(&self.db, request.key_id)
            .await?
            .ok_or_else(|| KeyfortError::NotFound(format!("api key {}", request.key_id)))?;

        let platform = queries::platforms::get_or_create_platform(
            &self.db,
            &request.platform_name,
            request.custom_icon.as_deref(),
        )
        .await?;

        // An unreadable current value counts as changed, so the entry gets
        // rewritten rather than silently kept.
        let current = match self.secrets.get(&existing.secret_ref).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key_id = existing.id, error = %e,
                    "stored value unreadable during edit, treating as changed");
                None
            }
        };
        let value_changed = current
            .map(|stored| stored.expose_secret() != request.secret_value)
            .unwrap_or(true);

        let mut is_valid = existing.is_valid;
        if value_changed {
            self.secrets
                .update(&request.secret_value, &existing.secret_ref)
                .await?;
            is_valid = false;
        }

        let updated = ApiKeyRecord {
            id: existing.id,
            display_name: request.display_name.clone(),
            secret_ref: existing.secret_ref.clone(),
            platform_id: platform.id,
            created_at: existing.created_at.clone(),
            is_valid,
            note: normalize_note(request.note.as_deref()),
        };
        queries::keys::update_key(&self.db, &updated).await?;

        info!(key_id = updated.id, value_changed, "api key updated");
        Ok(updated)
    }

    /// Delete a key, its secret entry, and -- if it was the last key of a
    /// non-default platform -- the platform row.
    ///
    /// The key count is read before any deletion so the cascade decision
    /// comes from a consistent snapshot.
    pub async fn delete_key(&self, key_id: i64) -> Result<(), KeyfortError> {
        let record = queries::keys::get_key_by_id(&self.db, key_id)
            .await?
            .ok_or_else(|| KeyfortError::NotFound(format!("api key {key_id}")))?;

        let platform = queries::platforms::get_platform_by_id(&self.db, record.platform_id).await?;
        let key_count =
            queries::platforms::key_count_for_platform(&self.db, record.platform_id).await?;
        let is_last_key = key_count == 1;

        // The secret entry goes first; if that fails, the metadata stays
        // untouched and the operation aborts.
        self.secrets.delete(&record.secret_ref).await?;
        queries::keys::delete_key(&self.db, record.id).await?;

        if is_last_key {
            if let Some(platform) = platform {
                if !platform.is_default() {
                    queries::platforms::delete_platform(&self.db, platform.id).await?;
                    info!(platform = %platform.name, "removed empty custom platform");
                }
            }
        }

        info!(key_id, "api key deleted");
        Ok(())
    }

    /// Re-run validation for a stored key and fold the outcome into its
    /// `is_valid` flag.
    ///
    /// Only definitive outcomes move the flag: `Valid` sets it, `Invalid`
    /// clears it, and unknown-status outcomes (server or network trouble)
    /// leave it as it was.
    pub async fn revalidate_key(&self, key_id: i64) -> Result<ValidationOutcome, KeyfortError> {
        let record = queries::keys::get_key_by_id(&self.db, key_id)
            .await?
            .ok_or_else(|| KeyfortError::NotFound(format!("api key {key_id}")))?;
        let platform = queries::platforms::get_platform_by_id(&self.db, record.platform_id)
            .await?
            .ok_or_else(|| KeyfortError::NotFound(format!("platform {}", record.platform_id)))?;
        let secret = self
            .secrets
            .get(&record.secret_ref)
            .await?
            .ok_or_else(|| {
                KeyfortError::NotFound(format!("secret entry {}", record.secret_ref))
            })?;

        let outcome = self
            .dispatcher
            .validate_key(&platform.name, secret.expose_secret())
            .await;

        let new_flag = match outcome {
            ValidationOutcome::Valid => Some(true),
            ValidationOutcome::Invalid { .. } => Some(false),
            _ => None,
        };
        if let Some(is_valid) = new_flag {
            if is_valid != record.is_valid {
                let mut updated = record;
                updated.is_valid = is_valid;
                queries::keys::update_key(&self.db, &updated).await?;
            }
        }

        Ok(outcome)
    }

    /// Fetch a key record by id.
    pub async fn get_key(&self, key_id: i64) -> Result<Option<ApiKeyRecord>, KeyfortError> {
        queries::keys::get_key_by_id(&self.db, key_id).await
    }

    /// Decrypt and return a record's secret value (detail/copy path).
    pub async fn reveal_secret(
        &self,
        record: &ApiKeyRecord,
    ) -> Result<Option<SecretString>, KeyfortError> {
        self.secrets.get(&record.secret_ref).await
    }

    /// List all platforms, sorted by name.
    pub async fn list_platforms(&self) -> Result<Vec<Platform>, KeyfortError> {
        queries::platforms::list_platforms(&self.db).await
    }

    /// List one platform's keys, most recently created first.
    pub async fn list_platform_keys(
        &self,
        platform_id: i64,
    ) -> Result<Vec<ApiKeyRecord>, KeyfortError> {
        queries::keys::list_keys_for_platform(&self.db, platform_id).await
    }

    /// Remove custom platform rows with zero keys. Default platforms are
    /// never removed. Returns the number of rows deleted.
    pub async fn cleanup_empty_custom_platforms(&self) -> Result<usize, KeyfortError> {
        queries::platforms::delete_empty_custom_platforms(
            &self.db,
            &keyfort_core::DEFAULT_PLATFORMS,
        )
        .await
    }

    async fn persist_new_key(
        &self,
        request: &NewKeyRequest,
        is_valid: bool,
    ) -> Result<ApiKeyRecord, KeyfortError> {
        let reference = Uuid::new_v4().to_string();

        // Write ordering invariant: the secret must land before any
        // metadata references it, so a failed write leaves no orphaned
        // record pointing at a missing secret.
        self.secrets.save(&request.secret_value, &reference).await?;

        let platform = queries::platforms::get_or_create_platform(
            &self.db,
            &request.platform_name,
            request.custom_icon.as_deref(),
        )
        .await?;

        let record = queries::keys::insert_key(
            &self.db,
            &request.display_name,
            &reference,
            platform.id,
            is_valid,
            normalize_note(request.note.as_deref()).as_deref(),
        )
        .await?;

        info!(key_id = record.id, platform = %platform.name, is_valid, "api key saved");
        Ok(record)
    }
}

fn validate_required_fields(
    display_name: &str,
    secret_value: &str,
    platform_name: &str,
) -> Result<(), KeyfortError> {
    if display_name.trim().is_empty() {
        return Err(KeyfortError::InvalidInput(NAME_REQUIRED.to_string()));
    }
    if secret_value.trim().is_empty() {
        return Err(KeyfortError::InvalidInput(VALUE_REQUIRED.to_string()));
    }
    if platform_name.trim().is_empty() {
        return Err(KeyfortError::InvalidInput(PLATFORM_REQUIRED.to_string()));
    }
    Ok(())
}

fn normalize_note(note: Option<&str>) -> Option<String> {
    let trimmed = note?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
