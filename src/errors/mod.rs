//! Error handling utilities for the moodlog application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents specific error cases that can occur during database operations.
///
/// Opening failures are reported as `Unavailable` and are fatal to the
/// application. Failures of individual CRUD calls surface as `Sqlite` or
/// `Pool` and leave previously cached state untouched.
///
/// # Examples
///
/// ```
/// use moodlog::errors::DatabaseError;
///
/// let error = DatabaseError::Closed;
/// assert!(format!("{}", error).contains("closed"));
///
/// let error = DatabaseError::InvalidRecord("unknown mood 'joyful'".to_string());
/// assert!(format!("{}", error).contains("joyful"));
/// ```
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The database file could not be opened or its schema could not be created.
    #[error("Mood database at {path} is unavailable: {source}. Check that the directory exists and is writable.")]
    Unavailable {
        /// Location of the database file
        path: PathBuf,
        /// Why the pool or the schema could not be set up
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// SQLite database error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}")]
    Pool(#[from] r2d2::Error),

    /// The store was closed and can no longer serve requests.
    #[error("Store has been closed; reopen the database before issuing further operations")]
    Closed,

    /// A stored row could not be decoded into a domain value.
    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),
}

/// Represents all possible errors that can occur in the moodlog application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use moodlog::errors::AppError;
///
/// let error = AppError::Config("Database path is empty".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Database path is empty");
/// ```
///
/// Converting from an IO error:
/// ```
/// use moodlog::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input rejected before it reached the store (out-of-range intensity,
    /// blank journal content, unknown mood name).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Errors related to database operations.
    ///
    /// This variant uses a dedicated DatabaseError type to provide detailed
    /// information about what went wrong with database operations.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// A blocking store task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Failure rendering output as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Database(DatabaseError::Sqlite(err))
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use moodlog::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Validation("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;
