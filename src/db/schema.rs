//! Database schema definitions and initialization.
//!
//! This module defines the SQLite schema for mood entries, journal entries and
//! preferences.

use crate::constants::{DEFAULT_DARK_MODE, PREF_DARK_MODE};
use crate::errors::{AppResult, DatabaseError};
use rusqlite::{params, Connection};
use tracing::{debug, info};

/// Creates all database tables and indexes.
///
/// This function is idempotent - it uses `CREATE TABLE IF NOT EXISTS`
/// and only seeds the default theme preference when it is missing, so an
/// existing user choice is never overwritten.
///
/// # Tables
///
/// - `moods`: Mood check-ins
/// - `journals`: Free-text journal entries
/// - `preferences`: Key/value settings
///
/// # Errors
///
/// Returns an error if any DDL statement fails.
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    debug!("Creating database tables");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS moods (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            mood TEXT NOT NULL CHECK(mood IN ('happy', 'calm', 'neutral', 'sad', 'anxious')),
            date TEXT NOT NULL,
            note TEXT,
            intensity REAL NOT NULL DEFAULT 0.5
        );

        CREATE INDEX IF NOT EXISTS idx_moods_date ON moods(date);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS journals (
            id TEXT PRIMARY KEY NOT NULL,
            date TEXT NOT NULL,
            content TEXT NOT NULL,
            mood TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_journals_date ON journals(date DESC);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS preferences (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        );
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    let seeded = conn
        .execute(
            "INSERT OR IGNORE INTO preferences (key, value) VALUES (?1, ?2)",
            params![PREF_DARK_MODE, DEFAULT_DARK_MODE],
        )
        .map_err(DatabaseError::Sqlite)?;
    if seeded > 0 {
        info!("Seeded default preference {}={}", PREF_DARK_MODE, DEFAULT_DARK_MODE);
    }

    debug!("Database tables created successfully");
    Ok(())
}
