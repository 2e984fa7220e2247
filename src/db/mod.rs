//! Local persistence for moods, journal entries and preferences.
//!
//! This module provides SQLite-backed storage behind the [`Store`] handle. It
//! uses connection pooling via r2d2, and every collection lives in its own
//! submodule of plain functions over a `Connection`.
//!
//! # Module Structure
//!
//! - `schema`: Table definitions and schema initialization
//! - `moods`: Mood check-ins, date-window queries and frequency counts
//! - `journals`: Journal entry CRUD
//! - `preferences`: Key/value settings
//!
//! # Example
//!
//! ```no_run
//! use moodlog::db::Store;
//! use moodlog::models::{MoodEntry, MoodKind};
//! use std::path::Path;
//!
//! let store = Store::open(Path::new("/tmp/moodlog.db"))?;
//! let now = chrono::Local::now().naive_local();
//! store.insert_mood(&MoodEntry::new(MoodKind::Calm, now))?;
//! assert_eq!(store.get_preference("darkMode")?.as_deref(), Some("false"));
//! store.close();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod journals;
pub mod moods;
pub mod preferences;
pub mod schema;

use crate::constants::POOL_MAX_SIZE;
use crate::errors::{AppResult, DatabaseError};
use crate::models::{JournalEntry, MoodEntry, MoodKind};
use chrono::{NaiveDate, NaiveDateTime};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info};

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Handle to the embedded mood database.
///
/// The handle is explicitly constructed by the application entry point and
/// shared (typically as `Arc<Store>`) with the state controller. After
/// [`Store::close`] every operation fails with [`DatabaseError::Closed`].
pub struct Store {
    pool: RwLock<Option<Pool<SqliteConnectionManager>>>,
    location: PathBuf,
}

impl Store {
    /// Opens or creates the database file and initializes its schema.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - The database file cannot be opened (`DatabaseError::Unavailable`)
    /// - The schema cannot be created (`DatabaseError::Unavailable`)
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening database at: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(POOL_MAX_SIZE)
            .connection_timeout(Duration::from_secs(5))
            .connection_customizer(Box::new(ConnectionPragmas))
            .build(manager)
            .map_err(|e| DatabaseError::Unavailable {
                path: db_path.to_path_buf(),
                source: Box::new(e),
            })?;

        Self::from_pool(pool, db_path.to_path_buf())
    }

    /// Opens a private in-memory database.
    ///
    /// The pool holds exactly one long-lived connection, since every SQLite
    /// in-memory connection is its own database.
    pub fn open_in_memory() -> AppResult<Self> {
        let pool = Pool::builder()
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .connection_customizer(Box::new(ConnectionPragmas))
            .build(SqliteConnectionManager::memory())
            .map_err(|e| DatabaseError::Unavailable {
                path: PathBuf::from(":memory:"),
                source: Box::new(e),
            })?;

        Self::from_pool(pool, PathBuf::from(":memory:"))
    }

    fn from_pool(pool: Pool<SqliteConnectionManager>, location: PathBuf) -> AppResult<Self> {
        let store = Store {
            pool: RwLock::new(Some(pool)),
            location,
        };

        store.initialize_schema().map_err(|e| DatabaseError::Unavailable {
            path: store.location.clone(),
            source: Box::new(e),
        })?;

        info!("Database opened successfully");
        Ok(store)
    }

    /// Gets a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Closed` after [`Store::close`], or a pool error
    /// if no connection becomes available.
    pub fn get_conn(&self) -> AppResult<PooledConnection> {
        let guard = self.pool.read().unwrap_or_else(PoisonError::into_inner);
        let pool = guard.as_ref().ok_or(DatabaseError::Closed)?;
        pool.get().map_err(|e| DatabaseError::Pool(e).into())
    }

    /// Initializes the database schema.
    ///
    /// Creates all necessary tables and seeds the default theme preference.
    /// This is idempotent and safe to call multiple times.
    pub fn initialize_schema(&self) -> AppResult<()> {
        let conn = self.get_conn()?;
        schema::create_tables(&conn)?;
        debug!("Database schema initialized");
        Ok(())
    }

    /// Where the database lives, for diagnostics.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Whether [`Store::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Releases the connection pool.
    ///
    /// Connections still checked out are closed when they are returned.
    /// Closing twice is harmless.
    pub fn close(&self) {
        let pool = self
            .pool
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if pool.is_some() {
            info!("Database at {:?} closed", self.location);
        }
    }

    pub fn insert_mood(&self, entry: &MoodEntry) -> AppResult<i64> {
        let conn = self.get_conn()?;
        moods::insert_mood(&conn, entry)
    }

    pub fn get_all_moods(&self) -> AppResult<Vec<MoodEntry>> {
        let conn = self.get_conn()?;
        moods::get_all_moods(&conn)
    }

    pub fn get_moods_in_last_n_days(
        &self,
        days: i64,
        now: NaiveDateTime,
    ) -> AppResult<Vec<MoodEntry>> {
        let conn = self.get_conn()?;
        moods::get_moods_in_last_n_days(&conn, days, now)
    }

    pub fn delete_moods_on_date(&self, day: NaiveDate) -> AppResult<usize> {
        let conn = self.get_conn()?;
        moods::delete_moods_on_date(&conn, day)
    }

    /// Replaces every mood recorded on `day` with `entry`, in one
    /// transaction. Returns the new entry's id.
    pub fn replace_moods_on_date(&self, day: NaiveDate, entry: &MoodEntry) -> AppResult<i64> {
        let mut conn = self.get_conn()?;
        moods::replace_moods_on_date(&mut conn, day, entry)
    }

    pub fn get_mood_frequency(&self) -> AppResult<BTreeMap<MoodKind, i64>> {
        let conn = self.get_conn()?;
        moods::mood_frequency(&conn)
    }

    pub fn insert_journal(&self, entry: &JournalEntry) -> AppResult<()> {
        let conn = self.get_conn()?;
        journals::insert_journal(&conn, entry)
    }

    pub fn get_all_journals(&self) -> AppResult<Vec<JournalEntry>> {
        let conn = self.get_conn()?;
        journals::get_all_journals(&conn)
    }

    /// Deletes a journal entry; an unknown id is a no-op returning 0.
    pub fn delete_journal(&self, id: &str) -> AppResult<usize> {
        let conn = self.get_conn()?;
        journals::delete_journal(&conn, id)
    }

    pub fn set_preference(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self.get_conn()?;
        preferences::set_preference(&conn, key, value)
    }

    pub fn get_preference(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self.get_conn()?;
        preferences::get_preference(&conn, key)
    }

    /// Deletes every mood and journal record in one transaction.
    /// Preferences are kept.
    pub fn clear_all(&self) -> AppResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction().map_err(DatabaseError::Sqlite)?;
        let moods_removed = moods::delete_all_moods(&tx)?;
        let journals_removed = journals::delete_all_journals(&tx)?;
        tx.commit().map_err(DatabaseError::Sqlite)?;

        info!(
            "Cleared {} mood entries and {} journal entries",
            moods_removed, journals_removed
        );
        Ok(())
    }
}

/// Connection customizer applying per-connection pragmas.
#[derive(Debug)]
struct ConnectionPragmas;

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(())
    }

    fn on_release(&self, _conn: Connection) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PREF_DARK_MODE;
    use crate::errors::AppError;
    use tempfile::TempDir;

    fn noon(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_database_open_and_connect() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let store = Store::open(&db_path).unwrap();
        let conn = store.get_conn().unwrap();

        let result: i32 = conn
            .query_row("SELECT 1 + 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(result, 2);
        assert!(db_path.exists());
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("dir").join("moods.db");

        Store::open(&db_path).unwrap();

        assert!(db_path.exists());
    }

    #[test]
    fn test_initialize_schema_idempotent() {
        let store = Store::open_in_memory().unwrap();

        store.initialize_schema().unwrap();
        store.initialize_schema().unwrap();

        assert_eq!(
            store.get_preference(PREF_DARK_MODE).unwrap(),
            Some("false".to_string())
        );
    }

    #[test]
    fn test_data_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let store = Store::open(&db_path).unwrap();
        store
            .insert_mood(&MoodEntry::new(MoodKind::Happy, noon(1)))
            .unwrap();
        store
            .insert_journal(&JournalEntry::new("remember this", noon(1), None))
            .unwrap();
        store.set_preference(PREF_DARK_MODE, "true").unwrap();
        store.close();
        drop(store);

        let reopened = Store::open(&db_path).unwrap();
        assert_eq!(reopened.get_all_moods().unwrap().len(), 1);
        assert_eq!(reopened.get_all_journals().unwrap().len(), 1);
        assert_eq!(
            reopened.get_preference(PREF_DARK_MODE).unwrap(),
            Some("true".to_string())
        );
    }

    #[test]
    fn test_store_operations_through_pooled_connections() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(&temp_dir.path().join("pooled.db")).unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 1, 8)
            .unwrap()
            .and_hms_nano_opt(7, 30, 15, 987_654_321)
            .unwrap();

        let mood = MoodEntry::new(MoodKind::Sad, now).with_note("rainy");
        let id = store.insert_mood(&mood).unwrap();
        let moods = store.get_all_moods().unwrap();
        assert_eq!(moods[0].id, Some(id));
        assert_eq!(moods[0].date, now);
        assert_eq!(store.get_moods_in_last_n_days(7, now).unwrap().len(), 1);
        assert_eq!(store.get_mood_frequency().unwrap()[&MoodKind::Sad], 1);
        assert_eq!(store.delete_moods_on_date(now.date()).unwrap(), 1);

        let journal = JournalEntry::new("notes", now, Some(MoodKind::Sad));
        store.insert_journal(&journal).unwrap();
        assert_eq!(store.get_all_journals().unwrap(), vec![journal.clone()]);
        assert_eq!(store.delete_journal(&journal.id).unwrap(), 1);

        store.set_preference("k", "v").unwrap();
        assert_eq!(store.get_preference("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_operations_after_close_fail() {
        let store = Store::open_in_memory().unwrap();
        store.close();
        store.close();

        assert!(store.is_closed());
        assert!(matches!(
            store.get_all_moods(),
            Err(AppError::Database(DatabaseError::Closed))
        ));
        assert!(matches!(
            store.set_preference("k", "v"),
            Err(AppError::Database(DatabaseError::Closed))
        ));
    }

    #[test]
    fn test_replace_moods_on_date_through_store() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_mood(&MoodEntry::new(MoodKind::Sad, noon(2)))
            .unwrap();

        let replacement = MoodEntry::new(MoodKind::Calm, noon(2));
        let id = store
            .replace_moods_on_date(replacement.day(), &replacement)
            .unwrap();

        let moods = store.get_all_moods().unwrap();
        assert_eq!(moods.len(), 1);
        assert_eq!(moods[0].id, Some(id));
        assert_eq!(moods[0].mood, MoodKind::Calm);
    }

    #[test]
    fn test_clear_all_keeps_preferences() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_mood(&MoodEntry::new(MoodKind::Happy, noon(1)))
            .unwrap();
        store
            .insert_journal(&JournalEntry::new("entry", noon(1), None))
            .unwrap();
        store.set_preference(PREF_DARK_MODE, "true").unwrap();

        store.clear_all().unwrap();

        assert!(store.get_all_moods().unwrap().is_empty());
        assert!(store.get_all_journals().unwrap().is_empty());
        assert_eq!(
            store.get_preference(PREF_DARK_MODE).unwrap(),
            Some("true".to_string())
        );
    }

    #[test]
    fn test_open_directory_path_fails() {
        let temp_dir = TempDir::new().unwrap();

        let result = Store::open(temp_dir.path());

        assert!(result.is_err());
    }
}
