//! Clock service
//!
//! Wall-clock reads and sleeps go through [`Clock`] so the poller can be
//! driven by a fake clock in tests.

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, SubsecRound};
use std::time::Duration;

/// Source of time for the poller
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current local wall-clock time, second precision
    fn now(&self) -> NaiveDateTime;

    /// Suspends the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Local time and tokio timers
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local().trunc_subsecs(0)
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_system_clock_has_second_precision() {
        let now = SystemClock.now();
        assert_eq!(now.nanosecond(), 0);
    }

    #[tokio::test]
    async fn test_system_clock_sleeps() {
        let start = std::time::Instant::now();
        SystemClock.sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
