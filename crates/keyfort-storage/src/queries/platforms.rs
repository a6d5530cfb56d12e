// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform CRUD operations.

use keyfort_core::{KeyfortError, Platform};
use rusqlite::params;

use crate::database::{map_tr_err, Database};

fn platform_from_row(row: &rusqlite::Row<'_>) -> Result<Platform, rusqlite::Error> {
    Ok(Platform {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        custom_icon: row.get(3)?,
    })
}

/// Insert a new platform row and return it with its assigned id.
pub async fn insert_platform(
    db: &Database,
    name: &str,
    custom_icon: Option<&str>,
) -> Result<Platform, KeyfortError> {
    let name = name.to_string();
    let custom_icon = custom_icon.map(|s| s.to_string());
    let created_at = chrono::Utc::now().to_rfc3339();

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO platforms (name, created_at, custom_icon) VALUES (?1, ?2, ?3)",
                params![name, created_at, custom_icon],
            )?;
            let id = conn.last_insert_rowid();
            Ok(Platform {
                id,
                name,
                created_at,
                custom_icon,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Get a platform by exact, case-sensitive name.
pub async fn get_platform_by_name(
    db: &Database,
    name: &str,
) -> Result<Option<Platform>, KeyfortError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, created_at, custom_icon FROM platforms WHERE name = ?1",
            )?;
            let result = stmt.query_row(params![name], platform_from_row);
            match result {
                Ok(platform) => Ok(Some(platform)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Get a platform by id.
pub async fn get_platform_by_id(
    db: &Database,
    id: i64,
) -> Result<Option<Platform>, KeyfortError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, created_at, custom_icon FROM platforms WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], platform_from_row);
            match result {
                Ok(platform) => Ok(Some(platform)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Get the platform named `name`, creating it if absent.
///
/// The name match is exact and case-sensitive; `custom_icon` is only
/// applied when a new row is created.
pub async fn get_or_create_platform(
    db: &Database,
    name: &str,
    custom_icon: Option<&str>,
) -> Result<Platform, KeyfortError> {
    if let Some(existing) = get_platform_by_name(db, name).await? {
        return Ok(existing);
    }
    insert_platform(db, name, custom_icon).await
}

/// List all platforms, sorted by name.
pub async fn list_platforms(db: &Database) -> Result<Vec<Platform>, KeyfortError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, created_at, custom_icon FROM platforms ORDER BY name ASC",
            )?;
            let rows = stmt.query_map([], platform_from_row)?;
            let mut platforms = Vec::new();
            for row in rows {
                platforms.push(row?);
            }
            Ok(platforms)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a platform row. Associated key records cascade.
pub async fn delete_platform(db: &Database, id: i64) -> Result<(), KeyfortError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM platforms WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Count the key records owned by a platform.
pub async fn key_count_for_platform(db: &Database, platform_id: i64) -> Result<i64, KeyfortError> {
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM api_keys WHERE platform_id = ?1",
                params![platform_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete custom platforms that have no keys, leaving the given default
/// platform names untouched. Returns the number of rows removed.
pub async fn delete_empty_custom_platforms(
    db: &Database,
    default_names: &[&str],
) -> Result<usize, KeyfortError> {
    let defaults: Vec<String> = default_names.iter().map(|s| s.to_string()).collect();
    db.connection()
        .call(move |conn| {
            let placeholders = defaults
                .iter()
                .map(|_| "?")
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "DELETE FROM platforms
                 WHERE id NOT IN (SELECT DISTINCT platform_id FROM api_keys)
                 AND name NOT IN ({placeholders})"
            );
            let removed = conn.execute(&sql, rusqlite::params_from_iter(defaults.iter()))?;
            Ok(removed)
        })
        .await
        .map_err(map_tr_err)
}
