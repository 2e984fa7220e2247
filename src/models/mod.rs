//! Domain types shared by the store and the state controller.
//!
//! Moods are a closed set of five kinds. The declaration order of
//! [`MoodKind`] is significant: statistics iterate kinds in this order and use
//! it to break ties.

use crate::constants::{DATETIME_STORAGE_FORMAT, DEFAULT_INTENSITY};
use crate::errors::{AppError, AppResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the five moods a user can check in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodKind {
    Happy,
    Calm,
    Neutral,
    Sad,
    Anxious,
}

impl MoodKind {
    /// Every kind, in declaration order.
    pub const ALL: [MoodKind; 5] = [
        MoodKind::Happy,
        MoodKind::Calm,
        MoodKind::Neutral,
        MoodKind::Sad,
        MoodKind::Anxious,
    ];

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodKind::Happy => "happy",
            MoodKind::Calm => "calm",
            MoodKind::Neutral => "neutral",
            MoodKind::Sad => "sad",
            MoodKind::Anxious => "anxious",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            MoodKind::Happy => "Happy",
            MoodKind::Calm => "Calm",
            MoodKind::Neutral => "Neutral",
            MoodKind::Sad => "Sad",
            MoodKind::Anxious => "Anxious",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MoodKind::Happy => "😊",
            MoodKind::Calm => "😌",
            MoodKind::Neutral => "😐",
            MoodKind::Sad => "😢",
            MoodKind::Anxious => "😰",
        }
    }
}

impl fmt::Display for MoodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`MoodKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown mood '{0}'. Expected one of: happy, calm, neutral, sad, anxious")]
pub struct ParseMoodError(pub String);

impl FromStr for MoodKind {
    type Err = ParseMoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        MoodKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseMoodError(s.to_string()))
    }
}

/// A single mood check-in.
///
/// `id` is `None` until the entry has been persisted.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use moodlog::models::{MoodEntry, MoodKind};
///
/// let at = NaiveDate::from_ymd_opt(2024, 1, 1)
///     .unwrap()
///     .and_hms_opt(9, 0, 0)
///     .unwrap();
/// let entry = MoodEntry::new(MoodKind::Happy, at);
/// assert_eq!(entry.intensity, 0.5);
/// assert!(entry.id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: Option<i64>,
    pub mood: MoodKind,
    pub date: NaiveDateTime,
    pub note: Option<String>,
    pub intensity: f64,
}

impl MoodEntry {
    /// Creates an unsaved entry with the default intensity and no note.
    pub fn new(mood: MoodKind, date: NaiveDateTime) -> Self {
        MoodEntry {
            id: None,
            mood,
            date,
            note: None,
            intensity: DEFAULT_INTENSITY,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    /// Calendar day the entry was recorded on.
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    /// Checks the entry before it is written.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the intensity is not a number in `[0, 1]`.
    pub fn validate(&self) -> AppResult<()> {
        if !(0.0..=1.0).contains(&self.intensity) {
            return Err(AppError::Validation(format!(
                "Mood intensity must be between 0 and 1, got {}",
                self.intensity
            )));
        }
        Ok(())
    }
}

/// A free-text journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub date: NaiveDateTime,
    pub content: String,
    pub mood: Option<MoodKind>,
}

impl JournalEntry {
    /// Creates an entry whose id is derived from its creation timestamp
    /// (milliseconds since the epoch).
    ///
    /// Two entries created in the same millisecond share an id, and storing
    /// the second one fails. `StateController::new_journal_entry` avoids this
    /// by skipping ids it already holds.
    pub fn new(content: impl Into<String>, date: NaiveDateTime, mood: Option<MoodKind>) -> Self {
        JournalEntry {
            id: date.and_utc().timestamp_millis().to_string(),
            date,
            content: content.into(),
            mood,
        }
    }

    /// Checks the entry before it is written.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the content is blank or the id is empty.
    pub fn validate(&self) -> AppResult<()> {
        if self.id.is_empty() {
            return Err(AppError::Validation(
                "Journal entry id cannot be empty".to_string(),
            ));
        }
        if self.content.trim().is_empty() {
            return Err(AppError::Validation(
                "Journal entry content cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Formats a datetime the way it is stored in the database.
pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_STORAGE_FORMAT).to_string()
}

/// Parses a stored datetime.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, DATETIME_STORAGE_FORMAT)
}
