//! Mood entry CRUD operations.
//!
//! This module provides functions for recording, reading, and aggregating
//! mood check-ins in the database. All functions accept a plain connection;
//! a `Transaction` derefs to `Connection` and works as well.

use crate::errors::{AppResult, DatabaseError};
use crate::models::{format_datetime, parse_datetime, MoodEntry, MoodKind};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;
use tracing::debug;

const SELECT_MOODS: &str = "SELECT id, mood, date, note, intensity FROM moods";

fn mood_from_row(row: &Row<'_>) -> rusqlite::Result<MoodEntry> {
    let mood: MoodKind = row
        .get::<_, String>(1)?
        .parse::<MoodKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    let date = parse_datetime(&row.get::<_, String>(2)?)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(MoodEntry {
        id: Some(row.get(0)?),
        mood,
        date,
        note: row.get(3)?,
        intensity: row.get(4)?,
    })
}

fn query_moods(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> AppResult<Vec<MoodEntry>> {
    let mut stmt = conn.prepare(sql).map_err(DatabaseError::Sqlite)?;
    let moods = stmt
        .query_map(params, mood_from_row)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;
    Ok(moods)
}

/// Appends a mood entry and returns its newly assigned id.
///
/// The entry's own `id` is ignored. No per-day uniqueness is enforced here;
/// see [`replace_moods_on_date`] for that.
///
/// # Errors
///
/// Returns `AppError::Validation` for an out-of-range intensity, or a
/// database error if the insert fails.
pub fn insert_mood(conn: &Connection, entry: &MoodEntry) -> AppResult<i64> {
    entry.validate()?;
    debug!("Inserting {} mood recorded at {}", entry.mood, entry.date);

    conn.execute(
        "INSERT INTO moods (mood, date, note, intensity) VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.mood.as_str(),
            format_datetime(&entry.date),
            entry.note,
            entry.intensity
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    let id = conn.last_insert_rowid();
    debug!("Mood inserted with id {}", id);
    Ok(id)
}

/// Returns every stored mood entry in insertion order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn get_all_moods(conn: &Connection) -> AppResult<Vec<MoodEntry>> {
    query_moods(conn, &format!("{} ORDER BY id ASC", SELECT_MOODS), [])
}

/// Returns entries recorded at or after `cutoff`, in insertion order.
pub fn get_moods_since(conn: &Connection, cutoff: NaiveDateTime) -> AppResult<Vec<MoodEntry>> {
    debug!("Getting moods recorded since {}", cutoff);
    query_moods(
        conn,
        &format!("{} WHERE date >= ?1 ORDER BY id ASC", SELECT_MOODS),
        params![format_datetime(&cutoff)],
    )
}

/// Returns entries whose date is no earlier than `now - days`.
///
/// The lower bound is inclusive: an entry exactly `days * 24h` old is
/// returned. There is no upper bound. When `now - days` is not
/// representable every entry is returned.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn get_moods_in_last_n_days(
    conn: &Connection,
    days: i64,
    now: NaiveDateTime,
) -> AppResult<Vec<MoodEntry>> {
    match Duration::try_days(days).and_then(|span| now.checked_sub_signed(span)) {
        Some(cutoff) => get_moods_since(conn, cutoff),
        None => {
            debug!("No representable cutoff {} days before {}; returning all moods", days, now);
            get_all_moods(conn)
        }
    }
}

/// Deletes every mood entry recorded on the calendar day `day`.
///
/// Returns the number of rows removed.
pub fn delete_moods_on_date(conn: &Connection, day: NaiveDate) -> AppResult<usize> {
    let removed = conn
        .execute(
            "DELETE FROM moods WHERE substr(date, 1, 10) = ?1",
            params![day.format("%Y-%m-%d").to_string()],
        )
        .map_err(DatabaseError::Sqlite)?;

    debug!("Deleted {} mood entries dated {}", removed, day);
    Ok(removed)
}

/// Replaces whatever was recorded on `day` with `entry`.
///
/// The delete and the insert run in one transaction, so an interruption
/// cannot leave the day without a mood.
///
/// # Errors
///
/// Returns an error if validation fails or either statement fails; in that
/// case the transaction is rolled back.
pub fn replace_moods_on_date(
    conn: &mut Connection,
    day: NaiveDate,
    entry: &MoodEntry,
) -> AppResult<i64> {
    entry.validate()?;

    let tx = conn.transaction().map_err(DatabaseError::Sqlite)?;
    delete_moods_on_date(&tx, day)?;
    let id = insert_mood(&tx, entry)?;
    tx.commit().map_err(DatabaseError::Sqlite)?;

    Ok(id)
}

/// Counts entries per mood kind.
///
/// Every [`MoodKind`] is present in the result; kinds without entries map to 0.
///
/// # Errors
///
/// Returns an error if the query fails or a stored mood name is unknown.
pub fn mood_frequency(conn: &Connection) -> AppResult<BTreeMap<MoodKind, i64>> {
    let mut frequency: BTreeMap<MoodKind, i64> =
        MoodKind::ALL.into_iter().map(|kind| (kind, 0)).collect();

    let mut stmt = conn
        .prepare("SELECT mood, COUNT(*) FROM moods GROUP BY mood")
        .map_err(DatabaseError::Sqlite)?;
    let counts: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    for (name, count) in counts {
        let kind = name
            .parse::<MoodKind>()
            .map_err(|e| DatabaseError::InvalidRecord(format!("{}", e)))?;
        frequency.insert(kind, count);
    }

    debug!("Mood frequency: {:?}", frequency);
    Ok(frequency)
}

/// Removes every mood entry. Returns the number of rows removed.
pub fn delete_all_moods(conn: &Connection) -> AppResult<usize> {
    let removed = conn
        .execute("DELETE FROM moods", [])
        .map_err(DatabaseError::Sqlite)?;
    Ok(removed)
}
