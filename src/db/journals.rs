//! Journal entry CRUD operations.

use crate::errors::{AppResult, DatabaseError};
use crate::models::{format_datetime, parse_datetime, JournalEntry, MoodKind};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use tracing::debug;

fn journal_from_row(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    let date = parse_datetime(&row.get::<_, String>(1)?)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    let mood = row
        .get::<_, Option<String>>(3)?
        .map(|name| name.parse::<MoodKind>())
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(JournalEntry {
        id: row.get(0)?,
        date,
        content: row.get(2)?,
        mood,
    })
}

/// Inserts a journal entry.
///
/// # Errors
///
/// Returns `AppError::Validation` for blank content, or a database error if
/// the insert fails (including a duplicate id).
pub fn insert_journal(conn: &Connection, entry: &JournalEntry) -> AppResult<()> {
    entry.validate()?;
    debug!("Inserting journal entry {}", entry.id);

    conn.execute(
        "INSERT INTO journals (id, date, content, mood) VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.id,
            format_datetime(&entry.date),
            entry.content,
            entry.mood.map(|m| m.as_str())
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(())
}

/// Returns every journal entry in insertion order.
pub fn get_all_journals(conn: &Connection) -> AppResult<Vec<JournalEntry>> {
    let mut stmt = conn
        .prepare("SELECT id, date, content, mood FROM journals ORDER BY rowid ASC")
        .map_err(DatabaseError::Sqlite)?;

    let journals = stmt
        .query_map([], journal_from_row)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(journals)
}

/// Deletes a journal entry by id.
///
/// Deleting an id that does not exist affects zero rows and is not an error.
/// Returns the number of rows removed.
pub fn delete_journal(conn: &Connection, id: &str) -> AppResult<usize> {
    let removed = conn
        .execute("DELETE FROM journals WHERE id = ?1", params![id])
        .map_err(DatabaseError::Sqlite)?;

    debug!("Deleted {} journal entries with id {}", removed, id);
    Ok(removed)
}

/// Removes every journal entry. Returns the number of rows removed.
pub fn delete_all_journals(conn: &Connection) -> AppResult<usize> {
    let removed = conn
        .execute("DELETE FROM journals", [])
        .map_err(DatabaseError::Sqlite)?;
    Ok(removed)
}
