//! Timestamp source for signed requests.

use time::OffsetDateTime;

/// Trait for providing the request timestamp.
pub trait Clock: Send + Sync {
    /// Current time in whole seconds since the UNIX epoch.
    fn unix_timestamp(&self) -> i64;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.unix_timestamp() > 1_577_836_800);
    }
}
