//! Subscribe/notify plumbing between the state controller and the UI.
//!
//! Observers are plain callbacks. They are invoked synchronously, in
//! subscription order, once per successful mutation.

use crate::models::{JournalEntry, MoodEntry};

/// Borrowed view of the controller's cached state handed to observers.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    pub mood_entries: &'a [MoodEntry],
    pub journal_entries: &'a [JournalEntry],
    pub dark_mode: bool,
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

// Sync keeps `&StateController` shareable, so its futures are Send.
type Callback = Box<dyn FnMut(&StateView<'_>) + Send + Sync>;

/// Ordered set of subscribed callbacks.
#[derive(Default)]
pub struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(SubscriptionId, Callback)>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StateView<'_>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify(&mut self, view: &StateView<'_>) {
        for (_, callback) in self.observers.iter_mut() {
            callback(view);
        }
    }
}
