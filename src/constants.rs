//! Constants used throughout the application.
//!
//! This module contains all constants used in the moodlog application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "moodlog";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A daily mood check-in and journal";

// Configuration Keys & Environment Variables
/// Environment variable for specifying the database file.
pub const ENV_VAR_MOODLOG_DB: &str = "MOODLOG_DB";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default database location relative to the user's home directory.
pub const DEFAULT_DB_SUBPATH: &str = ".local/share/moodlog/moodlog.db";
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// Logging Configuration
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Preferences
/// Preference key holding the theme flag.
pub const PREF_DARK_MODE: &str = "darkMode";
/// Value seeded for the theme flag when the store is first created.
pub const DEFAULT_DARK_MODE: &str = "false";

// Moods
/// Intensity recorded when a check-in does not specify one.
pub const DEFAULT_INTENSITY: f64 = 0.5;
/// Width of the "last week" statistics window, in days.
pub const LAST_WEEK_DAYS: i64 = 7;

// Storage
/// Text layout of datetimes in the database: fixed width, nanosecond
/// precision, sorts chronologically.
pub const DATETIME_STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";
/// Connections kept by the pool for a file-backed store.
pub const POOL_MAX_SIZE: u32 = 4;
