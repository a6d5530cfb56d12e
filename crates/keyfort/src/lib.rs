// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key lifecycle orchestration for the Keyfort credential vault.
//!
//! This crate ties the workspace together: the [`DuplicateDetector`] scans
//! the encrypted store for already-stored values, and the [`KeyLifecycle`]
//! orchestrator runs every user-initiated key action (create, edit,
//! delete, reveal, revalidate) against injected store and validator
//! handles.

pub mod duplicate;
pub mod lifecycle;

use std::sync::Arc;

use keyfort_config::KeyfortConfig;
use keyfort_core::KeyfortError;
use keyfort_secrets::EncryptedStore;
use keyfort_storage::Database;
use keyfort_validation::ValidationDispatcher;
use secrecy::SecretString;

pub use duplicate::DuplicateDetector;
pub use lifecycle::{KeyLifecycle, NewKeyRequest, SaveOutcome, UpdateKeyRequest};

/// Open the vault described by `config` and wire up a ready-to-use
/// [`KeyLifecycle`].
///
/// Opens (or creates) the metadata database, unlocks the encrypted store
/// with `passphrase` (creating it on first run), and builds the dispatcher
/// with the five real provider validators. Construct once at application
/// start and share the returned handle.
pub async fn open_vault(
    config: &KeyfortConfig,
    passphrase: &SecretString,
) -> Result<KeyLifecycle, KeyfortError> {
    let db = Database::open(&config.storage.database_path).await?;
    let conn = db.connection().clone();

    let store = if EncryptedStore::exists_on(&conn).await? {
        EncryptedStore::unlock(conn, passphrase).await?
    } else {
        EncryptedStore::create(conn, passphrase, &config.secrets).await?
    };

    let dispatcher = ValidationDispatcher::new(&config.validation)?;
    Ok(KeyLifecycle::new(db, Arc::new(store), dispatcher))
}
