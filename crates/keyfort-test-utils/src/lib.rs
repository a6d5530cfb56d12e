// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Keyfort integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests
//! without real crypto, SQLite, or provider APIs.
//!
//! # Components
//!
//! - [`MockSecretStore`] - In-memory secret store with failure injection
//! - [`MockValidator`] - Provider validator with a fixed outcome

pub mod mock_secret_store;
pub mod mock_validator;

pub use mock_secret_store::MockSecretStore;
pub use mock_validator::MockValidator;
