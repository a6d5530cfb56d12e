// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory mock secret store with failure injection.
//!
//! `MockSecretStore` implements `SecretStore` over a plain map, with
//! per-operation failure switches and a corrupt-reference set so tests can
//! exercise the orchestrator's abort paths and the duplicate scanner's
//! skip-on-unreadable behavior without touching real crypto or SQLite.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::Mutex;

use keyfort_core::{KeyfortError, SecretStore};

#[derive(Default)]
struct State {
    entries: BTreeMap<String, String>,
    corrupt: HashSet<String>,
    fail_save: bool,
    fail_update: bool,
    fail_delete: bool,
}

/// A mock secret store backed by an in-memory map.
///
/// References enumerate in sorted order for deterministic scans.
#[derive(Clone, Default)]
pub struct MockSecretStore {
    state: Arc<Mutex<State>>,
}

impl MockSecretStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock store pre-loaded with `(reference, value)` pairs.
    pub async fn with_entries(entries: &[(&str, &str)]) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock().await;
            for (reference, value) in entries {
                state
                    .entries
                    .insert(reference.to_string(), value.to_string());
            }
        }
        store
    }

    /// Make every subsequent `save` fail.
    pub async fn fail_saves(&self) {
        self.state.lock().await.fail_save = true;
    }

    /// Make every subsequent `update` fail.
    pub async fn fail_updates(&self) {
        self.state.lock().await.fail_update = true;
    }

    /// Make every subsequent `delete` fail.
    pub async fn fail_deletes(&self) {
        self.state.lock().await.fail_delete = true;
    }

    /// Mark `reference` as corrupt: it stays listed but `get` errors.
    pub async fn corrupt_entry(&self, reference: &str) {
        self.state.lock().await.corrupt.insert(reference.to_string());
    }

    /// Number of entries currently stored.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SecretStore for MockSecretStore {
    async fn save(&self, value: &str, reference: &str) -> Result<(), KeyfortError> {
        let mut state = self.state.lock().await;
        if state.fail_save {
            return Err(KeyfortError::SecretStore("mock save failure".to_string()));
        }
        state
            .entries
            .insert(reference.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, reference: &str) -> Result<Option<SecretString>, KeyfortError> {
        let state = self.state.lock().await;
        if state.corrupt.contains(reference) {
            return Err(KeyfortError::SecretStore(format!(
                "mock corrupt entry: {reference}"
            )));
        }
        Ok(state
            .entries
            .get(reference)
            .map(|value| SecretString::from(value.clone())))
    }

    async fn update(&self, value: &str, reference: &str) -> Result<(), KeyfortError> {
        let mut state = self.state.lock().await;
        if state.fail_update {
            return Err(KeyfortError::SecretStore("mock update failure".to_string()));
        }
        state
            .entries
            .insert(reference.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, reference: &str) -> Result<(), KeyfortError> {
        let mut state = self.state.lock().await;
        if state.fail_delete {
            return Err(KeyfortError::SecretStore("mock delete failure".to_string()));
        }
        state.entries.remove(reference);
        state.corrupt.remove(reference);
        Ok(())
    }

    async fn list_references(&self) -> Result<Vec<String>, KeyfortError> {
        let state = self.state.lock().await;
        Ok(state.entries.keys().cloned().collect())
    }

    async fn exists(&self, reference: &str) -> Result<bool, KeyfortError> {
        let state = self.state.lock().await;
        Ok(state.entries.contains_key(reference))
    }
}
