/*!
# Moodlog - Daily Mood Check-ins

Command-line front-end for the moodlog store and state controller.

## Usage

```text
moodlog [OPTIONS] <COMMAND>

Commands:
  checkin  Record today's mood, replacing any earlier check-in today
  today    Show today's mood
  journal  Manage journal entries
  stats    Show check-in statistics
  theme    Toggle dark mode and print the new setting
  affirm   Print an affirmation
  reset    Delete all mood check-ins and journal entries

Options:
      --db <PATH>            Path to the database file (overrides MOODLOG_DB)
  -v, --verbose              Print verbose output
      --log-format <FORMAT>  Log output format [default: text] [possible values: text, json]
```

## Configuration

- `MOODLOG_DB`: Database file (defaults to ~/.local/share/moodlog/moodlog.db)
- `RUST_LOG`: Log filter, overriding `--verbose`
*/

use clap::Parser;
use moodlog::cli::{CliArgs, Commands, JournalCommand};
use moodlog::config::Config;
use moodlog::constants::{DEFAULT_LOG_LEVEL, LOG_FORMAT_JSON};
use moodlog::errors::AppResult;
use moodlog::models::{MoodEntry, MoodKind};
use moodlog::state::StateController;
use moodlog::Store;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Serialize)]
struct StatsReport {
    check_in_days: usize,
    current_streak: u32,
    most_frequent: Option<MoodKind>,
    frequency: BTreeMap<MoodKind, i64>,
    last_week: usize,
}

fn init_tracing(verbose: bool, log_format: &str) {
    let default_level = if verbose { "debug" } else { DEFAULT_LOG_LEVEL };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if log_format == LOG_FORMAT_JSON {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose, &args.log_format);
    debug!("CLI arguments: {:?}", args);

    let config = Config::load_with_override(args.db.as_deref())?;
    config.validate()?;
    debug!("Configuration: {:?}", config);

    let store = Arc::new(Store::open(&config.db_path)?);
    debug!("Using database at {:?}", store.location());
    let mut state = StateController::new(Arc::clone(&store));
    state.subscribe(|view| {
        debug!(
            moods = view.mood_entries.len(),
            journals = view.journal_entries.len(),
            dark_mode = view.dark_mode,
            "State changed"
        );
    });
    state.load_all().await?;

    run(&mut state, args.command).await?;

    store.close();
    info!("Done");
    Ok(())
}

async fn run(state: &mut StateController, command: Commands) -> AppResult<()> {
    match command {
        Commands::Checkin {
            mood,
            note,
            intensity,
        } => {
            let mut entry = MoodEntry::new(mood, chrono::Local::now().naive_local());
            if let Some(note) = note {
                entry = entry.with_note(note);
            }
            if let Some(intensity) = intensity {
                entry = entry.with_intensity(intensity);
            }
            state.update_todays_mood(entry.clone()).await?;
            println!(
                "Checked in: {} {} (intensity {:.2})",
                mood.emoji(),
                mood.label(),
                entry.intensity
            );
        }
        Commands::Today => match state.todays_mood() {
            Some(entry) => {
                println!("{} {}", entry.mood.emoji(), entry.mood.label());
                if let Some(note) = &entry.note {
                    println!("{}", note);
                }
            }
            None => println!("No check-in yet today"),
        },
        Commands::Journal(JournalCommand::Add { text }) => {
            let entry = state.new_journal_entry(text);
            let id = entry.id.clone();
            state.add_journal(entry).await?;
            println!("Saved journal entry {}", id);
        }
        Commands::Journal(JournalCommand::List) => {
            if state.journal_entries().is_empty() {
                println!("No journal entries");
            }
            for entry in state.journal_entries() {
                let mood = entry.mood.map(|m| m.emoji()).unwrap_or("-");
                println!(
                    "{}\t{}\t{}\t{}",
                    entry.id,
                    entry.date.format("%Y-%m-%d %H:%M"),
                    mood,
                    entry.content
                );
            }
        }
        Commands::Journal(JournalCommand::Delete { id }) => {
            if state.delete_journal(&id).await? > 0 {
                println!("Deleted journal entry {}", id);
            } else {
                println!("No journal entry with id {}", id);
            }
        }
        Commands::Stats { json } => {
            let report = StatsReport {
                check_in_days: state.check_in_days(),
                current_streak: state.current_streak(),
                most_frequent: state.most_frequent_mood().await?,
                frequency: state.mood_frequency().await?,
                last_week: state.last_week_entries().await?.len(),
            };
            print_stats(&report, json)?;
        }
        Commands::Theme => {
            let enabled = state.toggle_dark_mode().await?;
            println!("Dark mode: {}", if enabled { "on" } else { "off" });
        }
        Commands::Affirm => println!("{}", state.random_affirmation()),
        Commands::Reset => {
            state.clear_all().await?;
            println!("All check-ins and journal entries deleted");
        }
    }
    Ok(())
}

fn print_stats(report: &StatsReport, json: bool) -> AppResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Check-ins: {}", report.check_in_days);
    println!("Current streak: {} days", report.current_streak);
    match report.most_frequent {
        Some(mood) => println!("Most frequent: {} {}", mood.emoji(), mood.label()),
        None => println!("Most frequent: -"),
    }
    println!("Last 7 days: {}", report.last_week);
    for (mood, count) in &report.frequency {
        println!("  {:<8} {}", mood.label(), count);
    }
    Ok(())
}
