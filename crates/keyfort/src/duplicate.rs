// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duplicate detection across the encrypted secret store.

use std::sync::Arc;

use keyfort_core::{DuplicateCheck, KeyfortError, SecretStore};
use keyfort_storage::queries;
use keyfort_storage::Database;
use secrecy::ExposeSecret;
use tracing::warn;

/// Platform name reported when a matched record's platform row is missing.
const UNKNOWN_PLATFORM: &str = "Неизвестно";

/// Scans every stored secret for an exact value match.
///
/// The store has no index by value, so this is an O(n) linear scan with one
/// decrypt-and-compare per entry -- acceptable because a personal vault
/// holds tens of keys, not thousands.
pub struct DuplicateDetector {
    db: Database,
    secrets: Arc<dyn SecretStore>,
}

impl DuplicateDetector {
    pub fn new(db: Database, secrets: Arc<dyn SecretStore>) -> Self {
        Self { db, secrets }
    }

    /// Check whether `candidate` is already stored under another reference.
    ///
    /// `exclude_reference` skips one reference from the scan -- used during
    /// edits so a key is not flagged against itself. An entry that cannot
    /// be read is skipped with a warning; partial corruption of one entry
    /// must not block the rest of the scan. A matching entry with no
    /// owning metadata record is likewise skipped.
    pub async fn check_for_duplicate(
        &self,
        candidate: &str,
        exclude_reference: Option<&str>,
    ) -> Result<DuplicateCheck, KeyfortError> {
        let references = self.secrets.list_references().await?;

        for reference in references {
            if Some(reference.as_str()) == exclude_reference {
                continue;
            }

            let stored = match self.secrets.get(&reference).await {
                Ok(Some(value)) => value,
                Ok(None) => continue,
                Err(e) => {
                    warn!(reference = %reference, error = %e,
                        "skipping unreadable secret entry during duplicate scan");
                    continue;
                }
            };

            if stored.expose_secret() != candidate {
                continue;
            }

            let Some(existing) = queries::keys::get_key_by_secret_ref(&self.db, &reference).await?
            else {
                continue;
            };

            let platform_name =
                queries::platforms::get_platform_by_id(&self.db, existing.platform_id)
                    .await?
                    .map(|platform| platform.name)
                    .unwrap_or_else(|| UNKNOWN_PLATFORM.to_string());

            return Ok(DuplicateCheck::Duplicate {
                existing,
                platform_name,
            });
        }

        Ok(DuplicateCheck::NotDuplicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyfort_test_utils::MockSecretStore;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("dup_test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn insert_record(db: &Database, platform: &str, name: &str, secret_ref: &str) {
        let platform = queries::platforms::get_or_create_platform(db, platform, None)
            .await
            .unwrap();
        queries::keys::insert_key(db, name, secret_ref, platform.id, false, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_store_is_not_duplicate() {
        let (db, _dir) = setup_db().await;
        let store = Arc::new(MockSecretStore::new());
        let detector = DuplicateDetector::new(db, store);

        let result = detector.check_for_duplicate("sk-new", None).await.unwrap();
        assert_eq!(result, DuplicateCheck::NotDuplicate);
    }

    #[tokio::test]
    async fn exact_match_reports_owning_record_and_platform() {
        let (db, _dir) = setup_db().await;
        let store = Arc::new(
            MockSecretStore::with_entries(&[("ref-1", "sk-stored"), ("ref-2", "sk-other")]).await,
        );
        insert_record(&db, "Anthropic", "work key", "ref-1").await;
        insert_record(&db, "OpenAI", "other key", "ref-2").await;

        let detector = DuplicateDetector::new(db, store);
        let result = detector
            .check_for_duplicate("sk-stored", None)
            .await
            .unwrap();

        match result {
            DuplicateCheck::Duplicate {
                existing,
                platform_name,
            } => {
                assert_eq!(existing.display_name, "work key");
                assert_eq!(existing.secret_ref, "ref-1");
                assert_eq!(platform_name, "Anthropic");
            }
            other => panic!("expected Duplicate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn detection_is_symmetric_for_equal_values() {
        let (db, _dir) = setup_db().await;
        let store = Arc::new(
            MockSecretStore::with_entries(&[("ref-a", "sk-same"), ("ref-b", "sk-same")]).await,
        );
        insert_record(&db, "Anthropic", "key a", "ref-a").await;
        insert_record(&db, "Gemini", "key b", "ref-b").await;

        let detector = DuplicateDetector::new(db, store);

        // Without exclusion, the shared value is a duplicate from either side.
        let result = detector.check_for_duplicate("sk-same", None).await.unwrap();
        assert!(matches!(result, DuplicateCheck::Duplicate { .. }));

        // Excluding one reference still finds the other copy.
        let result = detector
            .check_for_duplicate("sk-same", Some("ref-a"))
            .await
            .unwrap();
        match result {
            DuplicateCheck::Duplicate { existing, .. } => {
                assert_eq!(existing.secret_ref, "ref-b");
            }
            other => panic!("expected Duplicate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn excluding_own_reference_is_not_duplicate() {
        let (db, _dir) = setup_db().await;
        let store = Arc::new(MockSecretStore::with_entries(&[("ref-self", "sk-mine")]).await);
        insert_record(&db, "DeepSeek", "my key", "ref-self").await;

        let detector = DuplicateDetector::new(db, store);
        let result = detector
            .check_for_duplicate("sk-mine", Some("ref-self"))
            .await
            .unwrap();
        assert_eq!(result, DuplicateCheck::NotDuplicate);
    }

    #[tokio::test]
    async fn corrupt_entry_is_skipped_without_aborting_the_scan() {
        let (db, _dir) = setup_db().await;
        let store = Arc::new(
            MockSecretStore::with_entries(&[
                ("ref-1-corrupt", "unreachable"),
                ("ref-2", "sk-clean"),
                ("ref-3", "sk-target"),
            ])
            .await,
        );
        store.corrupt_entry("ref-1-corrupt").await;
        insert_record(&db, "Hailuo", "target key", "ref-3").await;

        let detector = DuplicateDetector::new(db, store);
        let result = detector
            .check_for_duplicate("sk-target", None)
            .await
            .unwrap();

        match result {
            DuplicateCheck::Duplicate { existing, .. } => {
                assert_eq!(existing.secret_ref, "ref-3");
            }
            other => panic!("expected Duplicate past the corrupt entry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn match_without_metadata_record_keeps_scanning() {
        let (db, _dir) = setup_db().await;
        // ref-orphan has the value but no api_keys row; ref-owned has both.
        let store = Arc::new(
            MockSecretStore::with_entries(&[("ref-orphan", "sk-dup"), ("ref-owned", "sk-dup")])
                .await,
        );
        insert_record(&db, "OpenAI", "owned key", "ref-owned").await;

        let detector = DuplicateDetector::new(db, store);
        let result = detector.check_for_duplicate("sk-dup", None).await.unwrap();

        match result {
            DuplicateCheck::Duplicate { existing, .. } => {
                assert_eq!(existing.secret_ref, "ref-owned");
            }
            other => panic!("expected Duplicate via the owned reference, got {other:?}"),
        }
    }
}
