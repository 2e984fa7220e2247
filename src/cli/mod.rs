//! Command-line interface for moodlog.

use crate::constants::{APP_DESCRIPTION, APP_NAME, LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use crate::models::MoodKind;
use clap::{Parser, Subcommand};

/// A daily mood check-in and journal
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION, author, version, long_about = None)]
pub struct CliArgs {
    /// Path to the database file (overrides MOODLOG_DB)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<String>,

    /// Print verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(
        long,
        global = true,
        value_name = "FORMAT",
        default_value = LOG_FORMAT_TEXT,
        value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON]
    )]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Record today's mood, replacing any earlier check-in today
    Checkin {
        /// One of: happy, calm, neutral, sad, anxious
        mood: MoodKind,

        /// Optional note attached to the check-in
        #[arg(short = 'n', long)]
        note: Option<String>,

        /// Strength of the feeling between 0.0 and 1.0
        #[arg(short = 'i', long)]
        intensity: Option<f64>,
    },

    /// Show today's mood
    Today,

    /// Manage journal entries
    #[command(subcommand)]
    Journal(JournalCommand),

    /// Show check-in statistics
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toggle dark mode and print the new setting
    Theme,

    /// Print an affirmation
    Affirm,

    /// Delete all mood check-ins and journal entries
    Reset,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum JournalCommand {
    /// Write a new journal entry
    Add {
        /// Entry text
        text: String,
    },

    /// List journal entries, oldest first
    List,

    /// Delete a journal entry by id
    Delete {
        /// Entry id as shown by `journal list`
        id: String,
    },
}
