use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Sliding one-minute window per sender number. A limit of zero disables
/// rate limiting.
pub struct RateLimiter {
    limit_per_minute: u32,
    hits: Mutex<HashMap<String, Vec<DateTime<Utc>>>>,
}

impl RateLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            limit_per_minute,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn allow(&self, key: &str, now: DateTime<Utc>) -> bool {
        if self.limit_per_minute == 0 {
            return true;
        }

        let mut hits = self.hits.lock().unwrap();
        let window_start = now - Duration::minutes(1);
        let entry = hits.entry(key.to_string()).or_default();
        entry.retain(|hit| *hit > window_start);
        if entry.len() as u32 >= self.limit_per_minute {
            return false;
        }
        entry.push(now);
        true
    }
}
