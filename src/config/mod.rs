//! Configuration management for moodlog.
//!
//! Settings come from environment variables with a sensible default, and the
//! command line may override the database location.
//!
//! # Environment Variables
//!
//! - `MOODLOG_DB`: Path to the SQLite database file
//!   (defaults to ~/.local/share/moodlog/moodlog.db)
//! - `HOME`: Used for building the default database path

use crate::constants::{DEFAULT_DB_SUBPATH, ENV_VAR_HOME, ENV_VAR_MOODLOG_DB, REDACTED_PLACEHOLDER};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Configuration for moodlog.
///
/// # Examples
///
/// ```
/// use moodlog::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("/tmp/moodlog.db"),
/// };
/// assert!(config.validate().is_ok());
/// ```
pub struct Config {
    /// Location of the SQLite database file.
    ///
    /// Resolved in order of precedence:
    /// 1. The `--db` command line flag
    /// 2. `MOODLOG_DB`
    /// 3. `$HOME/.local/share/moodlog/moodlog.db`
    pub db_path: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_path", &REDACTED_PLACEHOLDER)
            .finish()
    }
}

impl Config {
    /// Loads configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the path cannot be expanded or is empty.
    ///
    /// ```no_run
    /// use moodlog::Config;
    ///
    /// match Config::load() {
    ///     Ok(config) => println!("Database lives at {}", config.db_path.display()),
    ///     Err(err) => eprintln!("Failed to load config: {}", err),
    /// }
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with_override(None)
    }

    /// Loads configuration, preferring `db_override` over the environment.
    pub fn load_with_override(db_override: Option<&str>) -> AppResult<Self> {
        let raw = match db_override {
            Some(path) => path.to_string(),
            None => env::var(ENV_VAR_MOODLOG_DB).unwrap_or_else(|_| {
                let home = env::var(ENV_VAR_HOME).unwrap_or_default();
                format!("{}/{}", home, DEFAULT_DB_SUBPATH)
            }),
        };

        // Handles ~ and $VARS
        let expanded = shellexpand::full(&raw)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;

        let db_path = PathBuf::from(expanded.into_owned());
        if db_path.as_os_str().is_empty() {
            return Err(AppError::Config("Database path is empty".to_string()));
        }

        Ok(Config { db_path })
    }

    /// Checks that the database path is non-empty and absolute.
    pub fn validate(&self) -> AppResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("Database path is empty".to_string()));
        }

        if !self.db_path.is_absolute() {
            return Err(AppError::Config(
                "Database path must be an absolute path".to_string(),
            ));
        }

        Ok(())
    }
}
