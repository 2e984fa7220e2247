/*!
# Moodlog

Moodlog is the local persistence and state layer of a daily mood tracker and
journal. It records one mood check-in per day, free-form journal entries and a
theme preference in a SQLite database, and keeps an observable in-memory copy
of that data with a few derived views (today's mood, frequencies, last week,
streak, affirmations).

## Architecture

- `db`: SQLite store behind an r2d2 pool; schema, moods, journals, preferences
- `models`: Mood and journal record types
- `state`: The observable [`StateController`] plus clock and observer plumbing
- `affirmations`: Fixed affirmation list
- `cli`: Command-line interface handling using clap
- `config`: Configuration loading and validation
- `errors`: Error handling infrastructure

## Usage Example

```rust,no_run
use moodlog::{MoodEntry, MoodKind, StateController, Store};
use std::sync::Arc;

#[tokio::main]
async fn main() -> moodlog::AppResult<()> {
    let store = Arc::new(Store::open_in_memory()?);
    let mut state = StateController::new(store);
    state.load_all().await?;

    let now = chrono::Local::now().naive_local();
    state.update_todays_mood(MoodEntry::new(MoodKind::Calm, now)).await?;
    assert_eq!(state.todays_mood().map(|m| m.mood), Some(MoodKind::Calm));
    Ok(())
}
```
*/

pub mod affirmations;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
pub mod constants;
pub mod db;
/// Error types and utilities for error handling
pub mod errors;
pub mod models;
pub mod state;

pub use cli::CliArgs;
pub use config::Config;
pub use db::Store;
pub use errors::{AppError, AppResult};
pub use models::{JournalEntry, MoodEntry, MoodKind};
pub use state::StateController;
