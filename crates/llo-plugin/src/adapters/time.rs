//! Wall clock adapter

use crate::ports::outbound::TimeSource;

/// Time source backed by the system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_unix_nanoseconds(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
            // Clock before Unix epoch yields 0 rather than a panic
            .unwrap_or_default()
    }
}
