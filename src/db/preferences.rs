//! Key/value preference storage.

use crate::errors::{AppResult, DatabaseError};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

/// Inserts or replaces the value stored under `key`.
pub fn set_preference(conn: &Connection, key: &str, value: &str) -> AppResult<()> {
    debug!("Setting preference {}", key);

    conn.execute(
        r#"
        INSERT INTO preferences (key, value) VALUES (?1, ?2)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
        params![key, value],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(())
}

/// Retrieves the value stored under `key`.
///
/// Returns `Ok(None)` if the key was never set.
pub fn get_preference(conn: &Connection, key: &str) -> AppResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM preferences WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(DatabaseError::Sqlite)?;

    Ok(value)
}
