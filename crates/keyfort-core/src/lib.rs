// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Keyfort credential vault.
//!
//! This crate provides the error taxonomy, shared domain types, and the
//! adapter traits ([`SecretStore`], [`ProviderValidator`]) implemented by
//! the other workspace crates. It performs no I/O of its own.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::KeyfortError;
pub use traits::{ProviderValidator, SecretStore};
pub use types::{
    ApiKeyRecord, DuplicateCheck, Platform, ValidationOutcome, DEFAULT_PLATFORMS,
    is_default_platform,
};
