//! Observable in-memory state for the presentation layer.
//!
//! [`StateController`] caches the mood list, the journal list and the theme
//! flag, routes every mutation through the [`Store`], reloads the affected
//! list from the store after each write, and then notifies subscribers.
//!
//! Store calls are blocking SQLite work and run on tokio's blocking pool.
//! Every mutating operation takes `&mut self`, so operations never overlap.
//!
//! # Failure handling
//!
//! A failed operation is logged once at this boundary, leaves the cache
//! untouched, sends no notification, and returns the error to the caller.

pub mod clock;
pub mod observer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use observer::{ObserverRegistry, StateView, SubscriptionId};

use crate::affirmations::affirmation_at;
use crate::constants::{LAST_WEEK_DAYS, PREF_DARK_MODE};
use crate::db::Store;
use crate::errors::AppResult;
use crate::models::{JournalEntry, MoodEntry, MoodKind};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Picks the kind with the highest count.
///
/// Kinds are visited in declaration order and only a strictly greater count
/// replaces the current best, so ties go to the earlier-declared kind.
/// Returns `None` when every count is zero.
///
/// # Examples
///
/// ```
/// use moodlog::models::MoodKind;
/// use moodlog::state::most_frequent;
/// use std::collections::BTreeMap;
///
/// let counts = BTreeMap::from([(MoodKind::Sad, 2), (MoodKind::Calm, 2)]);
/// assert_eq!(most_frequent(&counts), Some(MoodKind::Calm));
/// ```
pub fn most_frequent(frequency: &BTreeMap<MoodKind, i64>) -> Option<MoodKind> {
    let mut best: Option<(MoodKind, i64)> = None;
    for kind in MoodKind::ALL {
        let count = frequency.get(&kind).copied().unwrap_or(0);
        let current = best.map(|(_, c)| c).unwrap_or(0);
        if count > current {
            best = Some((kind, count));
        }
    }
    best.map(|(kind, _)| kind)
}

fn report<T>(operation: &'static str, result: AppResult<T>) -> AppResult<T> {
    if let Err(e) = &result {
        error!(operation, error = %e, "State operation failed");
    }
    result
}

/// Single in-memory source of truth for the UI.
pub struct StateController {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    mood_entries: Vec<MoodEntry>,
    journal_entries: Vec<JournalEntry>,
    dark_mode: bool,
    loaded: bool,
    observers: ObserverRegistry,
}

impl StateController {
    /// Creates a controller reading "now" from the system clock.
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        StateController {
            store,
            clock,
            mood_entries: Vec::new(),
            journal_entries: Vec::new(),
            dark_mode: false,
            loaded: false,
            observers: ObserverRegistry::new(),
        }
    }

    async fn blocking<T, F>(&self, op: F) -> AppResult<T>
    where
        F: FnOnce(&Store) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store)).await?
    }

    fn notify(&mut self) {
        let view = StateView {
            mood_entries: &self.mood_entries,
            journal_entries: &self.journal_entries,
            dark_mode: self.dark_mode,
        };
        debug!("Notifying {} observers", self.observers.len());
        self.observers.notify(&view);
    }

    /// Registers a callback invoked after every successful mutation.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&StateView<'_>) + Send + Sync + 'static,
    {
        self.observers.subscribe(observer)
    }

    /// Removes a callback; it will not be invoked again.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn snapshot(&self) -> StateView<'_> {
        StateView {
            mood_entries: &self.mood_entries,
            journal_entries: &self.journal_entries,
            dark_mode: self.dark_mode,
        }
    }

    pub fn mood_entries(&self) -> &[MoodEntry] {
        &self.mood_entries
    }

    pub fn journal_entries(&self) -> &[JournalEntry] {
        &self.journal_entries
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Whether [`StateController::load_all`] has completed at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Reads all moods, all journal entries and the theme preference.
    pub async fn load_all(&mut self) -> AppResult<()> {
        let result = self
            .blocking(|store| {
                Ok((
                    store.get_all_moods()?,
                    store.get_all_journals()?,
                    store.get_preference(PREF_DARK_MODE)?,
                ))
            })
            .await;
        let (moods, journals, dark_mode) = report("load_all", result)?;

        info!(
            "Loaded {} mood entries and {} journal entries",
            moods.len(),
            journals.len()
        );
        self.mood_entries = moods;
        self.journal_entries = journals;
        self.dark_mode = dark_mode.as_deref() == Some("true");
        self.loaded = true;
        self.notify();
        Ok(())
    }

    /// Records a mood and reloads the mood list. Returns the new id.
    pub async fn add_mood(&mut self, entry: MoodEntry) -> AppResult<i64> {
        let result = self
            .blocking(move |store| {
                let id = store.insert_mood(&entry)?;
                Ok((id, store.get_all_moods()?))
            })
            .await;
        let (id, moods) = report("add_mood", result)?;

        self.mood_entries = moods;
        self.notify();
        Ok(id)
    }

    /// Replaces any mood recorded today with `entry` and reloads the mood list.
    ///
    /// This is what keeps at most one mood per calendar day. The delete and
    /// the insert share one transaction.
    pub async fn update_todays_mood(&mut self, entry: MoodEntry) -> AppResult<i64> {
        let today = self.clock.now().date();
        let result = self
            .blocking(move |store| {
                let id = store.replace_moods_on_date(today, &entry)?;
                Ok((id, store.get_all_moods()?))
            })
            .await;
        let (id, moods) = report("update_todays_mood", result)?;

        info!("Today's mood set (id {})", id);
        self.mood_entries = moods;
        self.notify();
        Ok(id)
    }

    /// Builds an unsaved journal entry stamped with the current time and a
    /// snapshot of today's mood.
    ///
    /// The id is the creation time in epoch milliseconds, moved forward past
    /// any id already cached so entries made within one millisecond do not
    /// collide.
    pub fn new_journal_entry(&self, content: impl Into<String>) -> JournalEntry {
        let mut entry = JournalEntry::new(
            content,
            self.clock.now(),
            self.todays_mood().map(|entry| entry.mood),
        );
        let mut millis = entry.date.and_utc().timestamp_millis();
        while self.journal_entries.iter().any(|existing| existing.id == entry.id) {
            millis += 1;
            entry.id = millis.to_string();
        }
        entry
    }

    pub async fn add_journal(&mut self, entry: JournalEntry) -> AppResult<()> {
        let result = self
            .blocking(move |store| {
                store.insert_journal(&entry)?;
                store.get_all_journals()
            })
            .await;
        self.journal_entries = report("add_journal", result)?;
        self.notify();
        Ok(())
    }

    /// Deletes a journal entry. An unknown id is not an error; the list is
    /// still reloaded and observers are still notified.
    pub async fn delete_journal(&mut self, id: &str) -> AppResult<usize> {
        let id = id.to_string();
        let result = self
            .blocking(move |store| {
                let removed = store.delete_journal(&id)?;
                Ok((removed, store.get_all_journals()?))
            })
            .await;
        let (removed, journals) = report("delete_journal", result)?;

        self.journal_entries = journals;
        self.notify();
        Ok(removed)
    }

    /// Flips the theme flag and persists it. Returns the new value.
    ///
    /// The cached flag only changes once the write succeeded.
    pub async fn toggle_dark_mode(&mut self) -> AppResult<bool> {
        let enabled = !self.dark_mode;
        let value = if enabled { "true" } else { "false" };
        let result = self
            .blocking(move |store| store.set_preference(PREF_DARK_MODE, value))
            .await;
        report("toggle_dark_mode", result)?;

        self.dark_mode = enabled;
        self.notify();
        Ok(enabled)
    }

    /// Deletes every mood and journal record and empties the cache.
    pub async fn clear_all(&mut self) -> AppResult<()> {
        let result = self.blocking(|store| store.clear_all()).await;
        report("clear_all", result)?;

        self.mood_entries.clear();
        self.journal_entries.clear();
        self.notify();
        Ok(())
    }

    /// First cached entry recorded on the current calendar day.
    pub fn todays_mood(&self) -> Option<&MoodEntry> {
        let today = self.clock.now().date();
        self.mood_entries.iter().find(|entry| entry.day() == today)
    }

    /// Number of cached mood entries.
    pub fn check_in_days(&self) -> usize {
        self.mood_entries.len()
    }

    pub async fn mood_frequency(&self) -> AppResult<BTreeMap<MoodKind, i64>> {
        let result = self.blocking(|store| store.get_mood_frequency()).await;
        report("mood_frequency", result)
    }

    pub async fn most_frequent_mood(&self) -> AppResult<Option<MoodKind>> {
        let frequency = self.mood_frequency().await?;
        Ok(most_frequent(&frequency))
    }

    /// Entries recorded within the last seven days of the clock's "now".
    pub async fn last_week_entries(&self) -> AppResult<Vec<MoodEntry>> {
        let now = self.clock.now();
        let result = self
            .blocking(move |store| store.get_moods_in_last_n_days(LAST_WEEK_DAYS, now))
            .await;
        report("last_week_entries", result)
    }

    pub fn random_affirmation(&self) -> &'static str {
        affirmation_at(self.clock.now())
    }

    /// Consecutive days with a check-in, ending today.
    ///
    /// A day without a check-in yet does not break the streak until it is
    /// over, so the count may end yesterday instead.
    pub fn current_streak(&self) -> u32 {
        let days: BTreeSet<NaiveDate> = self.mood_entries.iter().map(MoodEntry::day).collect();
        let today = self.clock.now().date();

        let mut cursor = if days.contains(&today) {
            today
        } else {
            match today.pred_opt() {
                Some(yesterday) if days.contains(&yesterday) => yesterday,
                _ => return 0,
            }
        };

        let mut streak = 0;
        while days.contains(&cursor) {
            streak += 1;
            match cursor.pred_opt() {
                Some(previous) => cursor = previous,
                None => break,
            }
        }
        streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AppError, DatabaseError};
    use chrono::{Duration, NaiveDateTime};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn controller_at(now: NaiveDateTime) -> (StateController, Arc<FixedClock>, Arc<Store>) {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let clock = Arc::new(FixedClock::new(now));
        let controller = StateController::with_clock(Arc::clone(&store), clock.clone());
        (controller, clock, store)
    }

    fn count_notifications(controller: &mut StateController) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        controller.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn test_most_frequent_tie_break_uses_declaration_order() {
        let counts = BTreeMap::from([
            (MoodKind::Anxious, 3),
            (MoodKind::Neutral, 3),
            (MoodKind::Happy, 1),
        ]);
        assert_eq!(most_frequent(&counts), Some(MoodKind::Neutral));
    }

    #[test]
    fn test_most_frequent_all_zero() {
        let counts: BTreeMap<MoodKind, i64> =
            MoodKind::ALL.into_iter().map(|kind| (kind, 0)).collect();
        assert_eq!(most_frequent(&counts), None);
        assert_eq!(most_frequent(&BTreeMap::new()), None);
    }

    #[tokio::test]
    async fn test_initial_state_before_load() {
        let (controller, _, _) = controller_at(at(2024, 1, 1, 9));
        assert!(!controller.is_loaded());
        assert!(controller.mood_entries().is_empty());
        assert!(controller.journal_entries().is_empty());
        assert!(!controller.dark_mode());
    }

    #[tokio::test]
    async fn test_add_mood_then_today() {
        let (mut controller, _, _) = controller_at(at(2024, 1, 1, 20));
        let notifications = count_notifications(&mut controller);
        controller.load_all().await.unwrap();

        let entry = MoodEntry::new(MoodKind::Happy, at(2024, 1, 1, 9)).with_intensity(0.5);
        let id = controller.add_mood(entry.clone()).await.unwrap();

        assert_eq!(controller.check_in_days(), 1);
        let today = controller.todays_mood().unwrap();
        assert_eq!(today.id, Some(id));
        assert_eq!(today.mood, MoodKind::Happy);
        assert_eq!(notifications.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_todays_mood_none_for_other_days() {
        let (mut controller, clock, _) = controller_at(at(2024, 1, 1, 20));
        controller
            .add_mood(MoodEntry::new(MoodKind::Sad, at(2024, 1, 1, 8)))
            .await
            .unwrap();

        clock.advance(Duration::days(1));

        assert!(controller.todays_mood().is_none());
    }

    #[tokio::test]
    async fn test_update_todays_mood_keeps_single_entry() {
        let (mut controller, _, store) = controller_at(at(2024, 1, 2, 21));
        controller
            .add_mood(MoodEntry::new(MoodKind::Calm, at(2024, 1, 1, 9)))
            .await
            .unwrap();

        let first = MoodEntry::new(MoodKind::Sad, at(2024, 1, 2, 9));
        let second = MoodEntry::new(MoodKind::Happy, at(2024, 1, 2, 18)).with_note("better");
        controller.update_todays_mood(first).await.unwrap();
        controller.update_todays_mood(second.clone()).await.unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let stored: Vec<MoodEntry> = store
            .get_all_moods()
            .unwrap()
            .into_iter()
            .filter(|e| e.day() == today)
            .collect();
        assert_eq!(stored.len(), 1);
        assert_eq!(MoodEntry { id: None, ..stored[0].clone() }, second);
        assert_eq!(controller.check_in_days(), 2);
        assert_eq!(controller.todays_mood().unwrap().mood, MoodKind::Happy);
    }

    #[tokio::test]
    async fn test_failed_operation_leaves_cache_and_skips_notification() {
        let (mut controller, _, store) = controller_at(at(2024, 1, 1, 9));
        controller
            .add_mood(MoodEntry::new(MoodKind::Happy, at(2024, 1, 1, 9)))
            .await
            .unwrap();
        let notifications = count_notifications(&mut controller);

        let invalid = MoodEntry::new(MoodKind::Sad, at(2024, 1, 1, 10)).with_intensity(3.0);
        let result = controller.add_mood(invalid).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        store.close();
        let result = controller.toggle_dark_mode().await;
        assert!(matches!(
            result,
            Err(AppError::Database(DatabaseError::Closed))
        ));

        assert_eq!(controller.check_in_days(), 1);
        assert!(!controller.dark_mode());
        assert_eq!(notifications.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_journal_add_and_delete() {
        let (mut controller, _, _) = controller_at(at(2024, 1, 1, 9));
        let entry = JournalEntry {
            id: "1".to_string(),
            date: at(2024, 1, 1, 9),
            content: "hello".to_string(),
            mood: None,
        };

        controller.add_journal(entry).await.unwrap();
        assert_eq!(controller.journal_entries().len(), 1);

        assert_eq!(controller.delete_journal("1").await.unwrap(), 1);
        assert_eq!(controller.delete_journal("1").await.unwrap(), 0);
        assert!(controller.journal_entries().is_empty());
    }

    #[tokio::test]
    async fn test_new_journal_entry_snapshots_todays_mood() {
        let (mut controller, clock, _) = controller_at(at(2024, 1, 1, 9));

        let before = controller.new_journal_entry("no mood yet");
        assert_eq!(before.mood, None);

        controller
            .update_todays_mood(MoodEntry::new(MoodKind::Calm, at(2024, 1, 1, 9)))
            .await
            .unwrap();
        clock.advance(Duration::minutes(5));

        let after = controller.new_journal_entry("feeling calm");
        assert_eq!(after.mood, Some(MoodKind::Calm));
        assert_eq!(after.date, at(2024, 1, 1, 9) + Duration::minutes(5));
        assert_ne!(before.id, after.id);
    }

    #[tokio::test]
    async fn test_journal_entries_within_one_millisecond_get_distinct_ids() {
        let (mut controller, _, store) = controller_at(at(2024, 1, 1, 9));

        for content in ["first", "second", "third"] {
            let entry = controller.new_journal_entry(content);
            controller.add_journal(entry).await.unwrap();
        }

        let ids: Vec<String> = store
            .get_all_journals()
            .unwrap()
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(ids, vec!["1704099600000", "1704099600001", "1704099600002"]);
    }

    #[tokio::test]
    async fn test_clock_precision_survives_reload() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_nano_opt(16, 9, 54, 507_793_580)
            .unwrap();
        let (mut controller, _, _) = controller_at(now);

        controller
            .update_todays_mood(MoodEntry::new(MoodKind::Happy, now))
            .await
            .unwrap();
        let journal = controller.new_journal_entry("precise");
        controller.add_journal(journal).await.unwrap();
        controller.load_all().await.unwrap();

        assert_eq!(controller.todays_mood().unwrap().date, now);
        assert_eq!(controller.journal_entries()[0].date, now);
        assert_eq!(controller.last_week_entries().await.unwrap().len(), 1);
    }

    #[test]
    fn test_controller_futures_are_send() {
        fn assert_send<T: Send>(_: T) {}

        let store = Arc::new(Store::open_in_memory().unwrap());
        let mut controller = StateController::new(store);
        assert_send(controller.mood_frequency());
        assert_send(controller.load_all());
    }

    #[tokio::test]
    async fn test_toggle_dark_mode_persists() {
        let (mut controller, _, store) = controller_at(at(2024, 1, 1, 9));
        controller.load_all().await.unwrap();

        assert!(controller.toggle_dark_mode().await.unwrap());
        assert_eq!(
            store.get_preference(PREF_DARK_MODE).unwrap(),
            Some("true".to_string())
        );

        assert!(!controller.toggle_dark_mode().await.unwrap());
        assert_eq!(
            store.get_preference(PREF_DARK_MODE).unwrap(),
            Some("false".to_string())
        );
    }

    #[tokio::test]
    async fn test_statistics_scenario() {
        let (mut controller, _, _) = controller_at(at(2024, 1, 10, 12));
        for day in 1..=3 {
            controller
                .add_mood(MoodEntry::new(MoodKind::Happy, at(2024, 1, day, 9)))
                .await
                .unwrap();
        }
        controller
            .add_mood(MoodEntry::new(MoodKind::Sad, at(2024, 1, 9, 9)))
            .await
            .unwrap();

        let frequency = controller.mood_frequency().await.unwrap();
        assert_eq!(frequency[&MoodKind::Neutral], 0);
        assert_eq!(frequency.values().sum::<i64>(), 4);
        assert_eq!(
            controller.most_frequent_mood().await.unwrap(),
            Some(MoodKind::Happy)
        );

        // Jan 3 09:00 is just over seven days before Jan 10 12:00
        let last_week = controller.last_week_entries().await.unwrap();
        assert_eq!(last_week.len(), 1);
        assert_eq!(last_week[0].mood, MoodKind::Sad);
    }

    #[tokio::test]
    async fn test_most_frequent_mood_empty() {
        let (controller, _, _) = controller_at(at(2024, 1, 1, 9));
        assert_eq!(controller.most_frequent_mood().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_all_empties_cache() {
        let (mut controller, _, store) = controller_at(at(2024, 1, 1, 9));
        controller
            .add_mood(MoodEntry::new(MoodKind::Happy, at(2024, 1, 1, 9)))
            .await
            .unwrap();
        let journal = controller.new_journal_entry("text");
        controller.add_journal(journal).await.unwrap();
        let notifications = count_notifications(&mut controller);

        controller.clear_all().await.unwrap();

        assert_eq!(controller.check_in_days(), 0);
        assert!(controller.journal_entries().is_empty());
        assert!(store.get_all_moods().unwrap().is_empty());
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_current_streak() {
        let (mut controller, clock, _) = controller_at(at(2024, 1, 5, 8));
        for day in [1, 3, 4] {
            controller
                .add_mood(MoodEntry::new(MoodKind::Calm, at(2024, 1, day, 9)))
                .await
                .unwrap();
        }

        // No check-in yet on the 5th: the streak still counts the 3rd and 4th
        assert_eq!(controller.current_streak(), 2);

        controller
            .update_todays_mood(MoodEntry::new(MoodKind::Happy, at(2024, 1, 5, 8)))
            .await
            .unwrap();
        assert_eq!(controller.current_streak(), 3);

        clock.set(at(2024, 1, 7, 8));
        assert_eq!(controller.current_streak(), 0);
    }

    #[tokio::test]
    async fn test_random_affirmation_follows_clock() {
        let (controller, clock, _) = controller_at(at(2024, 1, 1, 9));
        let first = controller.random_affirmation();
        clock.advance(Duration::milliseconds(1));
        let second = controller.random_affirmation();

        assert_ne!(first, second);
        assert!(crate::affirmations::AFFIRMATIONS.contains(&first));
    }

    #[tokio::test]
    async fn test_unsubscribed_observer_not_notified() {
        let (mut controller, _, _) = controller_at(at(2024, 1, 1, 9));
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let id = controller.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        controller.load_all().await.unwrap();
        assert!(controller.unsubscribe(id));
        controller.toggle_dark_mode().await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_observer_sees_refreshed_state() {
        let (mut controller, _, _) = controller_at(at(2024, 1, 1, 9));
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        controller.subscribe(move |view| {
            sink.lock()
                .unwrap()
                .push((view.mood_entries.len(), view.dark_mode));
        });

        controller
            .add_mood(MoodEntry::new(MoodKind::Happy, at(2024, 1, 1, 9)))
            .await
            .unwrap();
        controller.toggle_dark_mode().await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(1, false), (1, true)]);
    }
}
