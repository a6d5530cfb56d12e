// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! API key record CRUD operations.
//!
//! Records hold metadata only; the secret value lives in the encrypted
//! store under `secret_ref`.

use keyfort_core::{ApiKeyRecord, KeyfortError};
use rusqlite::params;

use crate::database::{map_tr_err, Database};

fn record_from_row(row: &rusqlite::Row<'_>) -> Result<ApiKeyRecord, rusqlite::Error> {
    Ok(ApiKeyRecord {
        id: row.get(0)?,
        display_name: row.get(1)?,
        secret_ref: row.get(2)?,
        platform_id: row.get(3)?,
        created_at: row.get(4)?,
        is_valid: row.get(5)?,
        note: row.get(6)?,
    })
}

const SELECT_COLS: &str =
    "SELECT id, display_name, secret_ref, platform_id, created_at, is_valid, note FROM api_keys";

/// Insert a new key record and return it with its assigned id.
pub async fn insert_key(
    db: &Database,
    display_name: &str,
    secret_ref: &str,
    platform_id: i64,
    is_valid: bool,
    note: Option<&str>,
) -> Result<ApiKeyRecord, KeyfortError> {
    let display_name = display_name.to_string();
    let secret_ref = secret_ref.to_string();
    let note = note.map(|s| s.to_string());
    let created_at = chrono::Utc::now().to_rfc3339();

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO api_keys (display_name, secret_ref, platform_id, created_at, is_valid, note)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![display_name, secret_ref, platform_id, created_at, is_valid, note],
            )?;
            let id = conn.last_insert_rowid();
            Ok(ApiKeyRecord {
                id,
                display_name,
                secret_ref,
                platform_id,
                created_at,
                is_valid,
                note,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Get a key record by id.
pub async fn get_key_by_id(db: &Database, id: i64) -> Result<Option<ApiKeyRecord>, KeyfortError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLS} WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], record_from_row);
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Get a key record by its secret-store reference.
pub async fn get_key_by_secret_ref(
    db: &Database,
    secret_ref: &str,
) -> Result<Option<ApiKeyRecord>, KeyfortError> {
    let secret_ref = secret_ref.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("{SELECT_COLS} WHERE secret_ref = ?1 LIMIT 1"))?;
            let result = stmt.query_row(params![secret_ref], record_from_row);
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List all key records, most recently created first.
pub async fn list_all_keys(db: &Database) -> Result<Vec<ApiKeyRecord>, KeyfortError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLS} ORDER BY created_at DESC"))?;
            let rows = stmt.query_map([], record_from_row)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// List key records for one platform, most recently created first.
pub async fn list_keys_for_platform(
    db: &Database,
    platform_id: i64,
) -> Result<Vec<ApiKeyRecord>, KeyfortError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLS} WHERE platform_id = ?1 ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map(params![platform_id], record_from_row)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Update a key record's mutable fields (display name, platform, validity,
/// note). `secret_ref` and `created_at` never change after insertion.
pub async fn update_key(db: &Database, record: &ApiKeyRecord) -> Result<(), KeyfortError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE api_keys
                 SET display_name = ?1, platform_id = ?2, is_valid = ?3, note = ?4
                 WHERE id = ?5",
                params![
                    record.display_name,
                    record.platform_id,
                    record.is_valid,
                    record.note,
                    record.id,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a key record by id.
pub async fn delete_key(db: &Database, id: i64) -> Result<(), KeyfortError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM api_keys WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Whether a record exists for the given secret-store reference.
pub async fn key_exists(db: &Database, secret_ref: &str) -> Result<bool, KeyfortError> {
    let secret_ref = secret_ref.to_string();
    db.connection()
        .call(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM api_keys WHERE secret_ref = ?1)",
                params![secret_ref],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
        .map_err(map_tr_err)
}
