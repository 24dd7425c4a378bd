use std::time::{SystemTime, UNIX_EPOCH};

/// Current UTC time in whole seconds, used for GTD expiry comparisons.
pub fn current_timestamp_secs() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}

/// Current UTC time in milliseconds, used for `running_time()`.
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as i64).unwrap_or(0)
}
