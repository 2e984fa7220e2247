//! Fixed affirmations shown alongside the daily check-in.

use chrono::NaiveDateTime;

/// The affirmations, in display order.
pub const AFFIRMATIONS: [&str; 12] = [
    "You are doing better than you think.",
    "Every feeling is valid, and every feeling passes.",
    "Small steps still move you forward.",
    "You deserve the same kindness you give others.",
    "Today is a fresh page.",
    "Breathe in calm, breathe out tension.",
    "You have survived every hard day so far.",
    "It is okay to rest.",
    "Your progress matters, no matter how slow.",
    "You are allowed to take up space.",
    "Be gentle with yourself today.",
    "You are enough, just as you are.",
];

/// Picks an affirmation from the epoch-millisecond count of `now`.
///
/// The choice is deterministic for a given instant and usually changes
/// between calls that are at least a millisecond apart. It is not random.
pub fn affirmation_at(now: NaiveDateTime) -> &'static str {
    let millis = now.and_utc().timestamp_millis();
    let index = millis.rem_euclid(AFFIRMATIONS.len() as i64) as usize;
    AFFIRMATIONS[index]
}
