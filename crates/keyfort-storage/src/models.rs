// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `keyfort-core::types` for use across
//! crate boundaries. This module re-exports them for convenience within
//! the storage crate.

pub use keyfort_core::types::{ApiKeyRecord, Platform};
