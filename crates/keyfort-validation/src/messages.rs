// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing validation outcome messages.
//!
//! Surfaced verbatim by the embedding UI, so the exact wording is part of
//! the contract.

/// Definitively wrong key (401, or provider auth-failure envelope).
pub const INVALID_KEY: &str = "Неверный API ключ";

/// Key exists but is blocked (403).
pub const KEY_BLOCKED: &str = "Ключ заблокирован";

/// Provider-side failure; key status unknown.
pub const SERVER_UNAVAILABLE: &str = "Сервер недоступен";

/// No network connectivity (DNS/connect failure).
pub const NO_CONNECTION: &str = "Нет подключения к сети";

/// Connect or read timeout expired.
pub const TIMEOUT: &str = "Превышено время ожидания";

/// Request rejected as malformed (400 without a key-related message).
pub const BAD_REQUEST: &str = "Неверный запрос";

/// Platform has no validator on the allow-list.
pub const UNSUPPORTED_PLATFORM: &str = "Платформа не поддерживает валидацию";

/// Prefix for unrecognized status codes: "Код ошибки: {status}".
pub const ERROR_CODE_PREFIX: &str = "Код ошибки: ";

/// Prefix for other transport errors: "Ошибка сети: {description}".
pub const NETWORK_ERROR_PREFIX: &str = "Ошибка сети: ";
