use chrono::{Duration, NaiveDateTime};

/// Fixed interval table keyed by mistake count, in days. More misses push a
/// word further out; this is a simplified memory curve, not SM-2.
pub const INTERVAL_DAYS_HIGH: i64 = 7;
pub const INTERVAL_DAYS_MID: i64 = 3;
pub const INTERVAL_DAYS_LOW: i64 = 1;

pub fn review_interval(count: i64) -> Duration {
    if count >= 3 {
        Duration::days(INTERVAL_DAYS_HIGH)
    } else if count == 2 {
        Duration::days(INTERVAL_DAYS_MID)
    } else {
        Duration::days(INTERVAL_DAYS_LOW)
    }
}

/// Due iff a wrong answer was ever recorded and its interval has elapsed.
/// An entry with no timestamp is never due.
pub fn is_due(count: i64, last_wrong: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
    match last_wrong {
        Some(last) => now.signed_duration_since(last) >= review_interval(count),
        None => false,
    }
}
