//! Timestamp utilities

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Milliseconds elapsed since `start`, saturating at `u64::MAX`
pub fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Convert whole seconds from configuration to a duration
pub fn secs_to_duration(secs: u64) -> Duration {
    Duration::from_secs(secs)
}
