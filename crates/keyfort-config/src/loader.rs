// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports `~/.config/keyfort/keyfort.toml` then `./keyfort.toml`, with
//! environment variable overrides via the `KEYFORT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::KeyfortConfig;

/// Load configuration from the standard locations with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `~/.config/keyfort/keyfort.toml` (user XDG config)
/// 3. `./keyfort.toml` (local directory)
/// 4. `KEYFORT_*` environment variables
pub fn load_config() -> Result<KeyfortConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeyfortConfig::default()))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("keyfort/keyfort.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("keyfort.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string only (no file lookup).
///
/// Used for testing and embedding.
pub fn load_config_from_str(toml_content: &str) -> Result<KeyfortConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeyfortConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KeyfortConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeyfortConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `KEYFORT_STORAGE_DATABASE_PATH` must
/// map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("KEYFORT_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("storage_", "storage.", 1)
            .replacen("secrets_", "secrets.", 1)
            .replacen("validation_", "validation.", 1);
        mapped.into()
    })
}
