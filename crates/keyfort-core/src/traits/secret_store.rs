// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Opaque encrypted key-value store for plaintext secret values.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::KeyfortError;

/// Contract for the encrypted secret store.
///
/// Values are addressed solely by an opaque reference string and are never
/// exposed unencrypted outside the implementation, except through
/// [`SecretStore::get`], which hands the plaintext back wrapped in a
/// [`SecretString`].
///
/// There is deliberately no way to look a value up by content: duplicate
/// detection enumerates [`SecretStore::list_references`] and compares each
/// decrypted value, accepting an O(n) scan rather than maintaining a
/// plaintext or equality-preserving index.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Store `value` under `reference`, overwriting any existing entry.
    async fn save(&self, value: &str, reference: &str) -> Result<(), KeyfortError>;

    /// Retrieve the value stored under `reference`.
    ///
    /// Returns `Ok(None)` for a missing reference. A present-but-unreadable
    /// entry (corrupted ciphertext, failed decryption) is an `Err`; scanning
    /// callers skip such entries rather than aborting.
    async fn get(&self, reference: &str) -> Result<Option<SecretString>, KeyfortError>;

    /// Replace the value stored under `reference` in place.
    async fn update(&self, value: &str, reference: &str) -> Result<(), KeyfortError>;

    /// Remove the entry stored under `reference`.
    async fn delete(&self, reference: &str) -> Result<(), KeyfortError>;

    /// Enumerate every reference currently present in the store.
    async fn list_references(&self) -> Result<Vec<String>, KeyfortError>;

    /// Whether an entry exists under `reference`.
    async fn exists(&self, reference: &str) -> Result<bool, KeyfortError>;
}
