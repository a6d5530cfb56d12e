// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted store lifecycle: create, unlock, and the [`SecretStore`]
//! operations over reference-addressed entries.
//!
//! The store uses a key-wrapping pattern:
//! - A random master key encrypts all secret values (stored in
//!   secret_entries, one row per reference).
//! - The master key itself is encrypted with a key derived from the user's
//!   passphrase via Argon2id (stored in secret_meta as wrapped_master_key).
//! - Changing the passphrase only re-wraps the master key; individual
//!   entries are never re-encrypted.
//!
//! Entries are addressed solely by their opaque reference. There is no
//! lookup by value: an equality-preserving index would require keeping
//! plaintext (or weakening the encryption), so value comparison is left to
//! the duplicate scanner, which decrypts one entry at a time.

use async_trait::async_trait;
use keyfort_config::SecretsConfig;
use keyfort_core::{KeyfortError, SecretStore};
use rusqlite::params;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto;
use crate::kdf;

/// The unlocked encrypted store, holding the master key in memory.
///
/// Debug output intentionally omits the master key.
pub struct EncryptedStore {
    /// The unwrapped master key -- only in memory, never on disk.
    master_key: Zeroizing<[u8; 32]>,
    /// Database connection for secret_entries and secret_meta tables.
    conn: tokio_rusqlite::Connection,
}

impl std::fmt::Debug for EncryptedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedStore")
            .field("master_key", &"[REDACTED]")
            .finish()
    }
}

impl EncryptedStore {
    /// Check if a store exists (has a wrapped master key in secret_meta).
    pub async fn exists_on(conn: &tokio_rusqlite::Connection) -> Result<bool, KeyfortError> {
        conn.call(|conn| -> Result<bool, rusqlite::Error> {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM secret_meta WHERE key = 'wrapped_master_key'",
                [],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(map_tr_err)
    }

    /// Create a new store with a random master key wrapped by the passphrase.
    pub async fn create(
        conn: tokio_rusqlite::Connection,
        passphrase: &SecretString,
        config: &SecretsConfig,
    ) -> Result<Self, KeyfortError> {
        let master_key = crypto::generate_random_key()?;

        let salt = kdf::generate_salt()?;
        let wrapping_key = kdf::derive_key(
            passphrase.expose_secret().as_bytes(),
            &salt,
            config.kdf_memory_cost,
            config.kdf_iterations,
            config.kdf_parallelism,
        )?;

        let (wrapped_master_key, wrap_nonce) = crypto::seal(&wrapping_key, &master_key)?;

        // Persist the KDF params alongside the wrapped key so later unlocks
        // are unaffected by config changes.
        let kdf_params = serde_json::json!({
            "memory_cost": config.kdf_memory_cost,
            "iterations": config.kdf_iterations,
            "parallelism": config.kdf_parallelism,
        });
        let kdf_params_bytes = kdf_params.to_string().into_bytes();

        let salt_vec = salt.to_vec();
        let wrap_nonce_vec = wrap_nonce.to_vec();
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT OR REPLACE INTO secret_meta (key, value) VALUES ('wrapped_master_key', ?1)",
                params![wrapped_master_key],
            )?;
            tx.execute(
                "INSERT OR REPLACE INTO secret_meta (key, value) VALUES ('master_key_nonce', ?1)",
                params![wrap_nonce_vec],
            )?;
            tx.execute(
                "INSERT OR REPLACE INTO secret_meta (key, value) VALUES ('kdf_salt', ?1)",
                params![salt_vec],
            )?;
            tx.execute(
                "INSERT OR REPLACE INTO secret_meta (key, value) VALUES ('kdf_params', ?1)",
                params![kdf_params_bytes],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        info!("encrypted store created");
        Ok(Self {
            master_key: Zeroizing::new(master_key),
            conn,
        })
    }

    /// Unlock an existing store by deriving the wrapping key from the
    /// passphrase and decrypting the stored master key.
    pub async fn unlock(
        conn: tokio_rusqlite::Connection,
        passphrase: &SecretString,
    ) -> Result<Self, KeyfortError> {
        let meta = conn
            .call(|conn| -> Result<StoreMeta, rusqlite::Error> {
                let wrapped_master_key: Vec<u8> = conn.query_row(
                    "SELECT value FROM secret_meta WHERE key = 'wrapped_master_key'",
                    [],
                    |row| row.get(0),
                )?;
                let nonce: Vec<u8> = conn.query_row(
                    "SELECT value FROM secret_meta WHERE key = 'master_key_nonce'",
                    [],
                    |row| row.get(0),
                )?;
                let salt: Vec<u8> = conn.query_row(
                    "SELECT value FROM secret_meta WHERE key = 'kdf_salt'",
                    [],
                    |row| row.get(0),
                )?;
                let kdf_params_bytes: Vec<u8> = conn.query_row(
                    "SELECT value FROM secret_meta WHERE key = 'kdf_params'",
                    [],
                    |row| row.get(0),
                )?;
                Ok(StoreMeta {
                    wrapped_master_key,
                    nonce,
                    salt,
                    kdf_params_bytes,
                })
            })
            .await
            .map_err(map_tr_err)?;

        let kdf_params: serde_json::Value = serde_json::from_slice(&meta.kdf_params_bytes)
            .map_err(|e| KeyfortError::SecretStore(format!("corrupted KDF params: {e}")))?;

        let memory_cost = kdf_param_u32(&kdf_params, "memory_cost")?;
        let iterations = kdf_param_u32(&kdf_params, "iterations")?;
        let parallelism = kdf_param_u32(&kdf_params, "parallelism")?;

        let salt: [u8; 16] = meta.salt.try_into().map_err(|_| {
            KeyfortError::SecretStore("corrupted salt (expected 16 bytes)".to_string())
        })?;
        let nonce: [u8; 12] = meta.nonce.try_into().map_err(|_| {
            KeyfortError::SecretStore("corrupted nonce (expected 12 bytes)".to_string())
        })?;

        let wrapping_key = kdf::derive_key(
            passphrase.expose_secret().as_bytes(),
            &salt,
            memory_cost,
            iterations,
            parallelism,
        )?;

        let master_key_bytes = crypto::open(&wrapping_key, &nonce, &meta.wrapped_master_key)
            .map_err(|_| {
                KeyfortError::SecretStore(
                    "invalid passphrase or corrupted store -- decryption failed".to_string(),
                )
            })?;

        let master_key: [u8; 32] = master_key_bytes.try_into().map_err(|_| {
            KeyfortError::SecretStore("corrupted master key (expected 32 bytes)".to_string())
        })?;

        debug!("encrypted store unlocked");
        Ok(Self {
            master_key: Zeroizing::new(master_key),
            conn,
        })
    }

    /// Change the passphrase by re-wrapping the master key.
    ///
    /// Entries are NOT re-encrypted -- only the master key wrapper changes.
    pub async fn change_passphrase(
        &self,
        new_passphrase: &SecretString,
        config: &SecretsConfig,
    ) -> Result<(), KeyfortError> {
        let new_salt = kdf::generate_salt()?;
        let new_wrapping_key = kdf::derive_key(
            new_passphrase.expose_secret().as_bytes(),
            &new_salt,
            config.kdf_memory_cost,
            config.kdf_iterations,
            config.kdf_parallelism,
        )?;

        let (new_wrapped_key, new_nonce) = crypto::seal(&new_wrapping_key, &*self.master_key)?;

        let kdf_params = serde_json::json!({
            "memory_cost": config.kdf_memory_cost,
            "iterations": config.kdf_iterations,
            "parallelism": config.kdf_parallelism,
        });
        let kdf_params_bytes = kdf_params.to_string().into_bytes();
        let new_salt_vec = new_salt.to_vec();
        let new_nonce_vec = new_nonce.to_vec();

        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "UPDATE secret_meta SET value = ?1 WHERE key = 'wrapped_master_key'",
                    params![new_wrapped_key],
                )?;
                tx.execute(
                    "UPDATE secret_meta SET value = ?1 WHERE key = 'master_key_nonce'",
                    params![new_nonce_vec],
                )?;
                tx.execute(
                    "UPDATE secret_meta SET value = ?1 WHERE key = 'kdf_salt'",
                    params![new_salt_vec],
                )?;
                tx.execute(
                    "UPDATE secret_meta SET value = ?1 WHERE key = 'kdf_params'",
                    params![kdf_params_bytes],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        info!("store passphrase changed");
        Ok(())
    }

    async fn put(&self, value: &str, reference: &str) -> Result<(), KeyfortError> {
        let (ciphertext, nonce) = crypto::seal(&self.master_key, value.as_bytes())?;
        let reference_owned = reference.to_string();
        let nonce_vec = nonce.to_vec();

        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT OR REPLACE INTO secret_entries (reference, ciphertext, nonce)
                     VALUES (?1, ?2, ?3)",
                    params![reference_owned, ciphertext, nonce_vec],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        debug!(reference = %reference, "secret entry written");
        Ok(())
    }
}

#[async_trait]
impl SecretStore for EncryptedStore {
    async fn save(&self, value: &str, reference: &str) -> Result<(), KeyfortError> {
        self.put(value, reference).await
    }

    async fn get(&self, reference: &str) -> Result<Option<SecretString>, KeyfortError> {
        let reference = reference.to_string();
        type CipherNonce = (Vec<u8>, Vec<u8>);
        let entry = self
            .conn
            .call(move |conn| -> Result<Option<CipherNonce>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT ciphertext, nonce FROM secret_entries WHERE reference = ?1",
                )?;
                let result = stmt.query_row(params![reference], |row| {
                    Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Vec<u8>>(1)?))
                });
                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(map_tr_err)?;

        match entry {
            Some((ciphertext, nonce_vec)) => {
                let nonce: [u8; 12] = nonce_vec.try_into().map_err(|_| {
                    KeyfortError::SecretStore("corrupted nonce in secret entry".to_string())
                })?;
                let plaintext = crypto::open(&self.master_key, &nonce, &ciphertext)?;
                let value = String::from_utf8(plaintext).map_err(|e| {
                    KeyfortError::SecretStore(format!("decrypted value is not valid UTF-8: {e}"))
                })?;
                Ok(Some(SecretString::from(value)))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, value: &str, reference: &str) -> Result<(), KeyfortError> {
        // Entries are upserts; updating re-seals with a fresh nonce.
        self.put(value, reference).await
    }

    async fn delete(&self, reference: &str) -> Result<(), KeyfortError> {
        let reference_owned = reference.to_string();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "DELETE FROM secret_entries WHERE reference = ?1",
                    params![reference_owned],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(reference = %reference, "secret entry deleted");
        Ok(())
    }

    async fn list_references(&self) -> Result<Vec<String>, KeyfortError> {
        self.conn
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt =
                    conn.prepare("SELECT reference FROM secret_entries ORDER BY reference")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                let mut references = Vec::new();
                for row in rows {
                    references.push(row?);
                }
                Ok(references)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn exists(&self, reference: &str) -> Result<bool, KeyfortError> {
        let reference = reference.to_string();
        self.conn
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM secret_entries WHERE reference = ?1)",
                    params![reference],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Internal struct for reading secret_meta entries.
struct StoreMeta {
    wrapped_master_key: Vec<u8>,
    nonce: Vec<u8>,
    salt: Vec<u8>,
    kdf_params_bytes: Vec<u8>,
}

fn kdf_param_u32(params: &serde_json::Value, name: &str) -> Result<u32, KeyfortError> {
    params[name]
        .as_u64()
        .map(|v| v as u32)
        .ok_or_else(|| KeyfortError::SecretStore(format!("missing {name} in KDF params")))
}

/// Mask a secret value for display: "sk-a...mnop" format.
///
/// Shows up to 4 leading and 4 trailing characters with "..." in between.
/// Short values (< 10 chars) are fully masked as "****".
pub fn mask_secret(value: &str) -> String {
    if value.len() < 10 {
        return "****".to_string();
    }
    let prefix = &value[..4.min(value.len())];
    let suffix = &value[value.len().saturating_sub(4)..];
    format!("{prefix}...{suffix}")
}

/// Convert tokio-rusqlite errors to KeyfortError::SecretStore.
fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> KeyfortError {
    KeyfortError::SecretStore(format!("secret store database error: {e}"))
}
