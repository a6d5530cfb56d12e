// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits forming the dependency-injection seams of the vault.

pub mod secret_store;
pub mod validator;

pub use secret_store::SecretStore;
pub use validator::ProviderValidator;
