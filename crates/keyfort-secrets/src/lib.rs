// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM encrypted secret store for the Keyfort credential vault.
//!
//! Implements the [`keyfort_core::SecretStore`] contract over SQLite using
//! a key-wrapping pattern: a random master key encrypts every secret
//! value, and the master key itself is protected by a passphrase-derived
//! key via Argon2id.

pub mod crypto;
pub mod kdf;
pub mod store;

pub use store::{mask_secret, EncryptedStore};
