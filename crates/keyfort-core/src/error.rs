// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Keyfort credential vault.

use thiserror::Error;

/// The primary error type used across all Keyfort crates.
///
/// Provider validators never surface this type from `validate` -- every
/// failure inside a validator resolves to a `ValidationOutcome` variant
/// instead. Everything else propagates `KeyfortError` with `?`.
#[derive(Debug, Error)]
pub enum KeyfortError {
    /// Configuration errors (invalid TOML, bad field values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Metadata store errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Encrypted secret store errors (crypto failure, corrupted entry,
    /// wrong passphrase, underlying database failure).
    #[error("secret store error: {0}")]
    SecretStore(String),

    /// A required input field was blank or malformed. Rejected before any I/O.
    #[error("{0}")]
    InvalidInput(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
