// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Keyfort credential vault.
//!
//! Serde model structs with per-field defaults plus a Figment loader that
//! merges compiled defaults, TOML files, and `KEYFORT_` environment
//! variables.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{KeyfortConfig, SecretsConfig, StorageConfig, ValidationConfig};
