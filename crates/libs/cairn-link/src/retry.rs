//! Bounded backoff for transient delivery failures.

use std::time::Duration;

/// Retry budget for one logical request: how many transmissions total,
/// and how long to wait before each re-send. The firmware's own
/// link-level retransmits sit below this layer, so the budget here stays
/// small.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetrySchedule {
    /// Total transmissions allowed, the first included.
    pub max_attempts: u32,
    /// Delay before attempt 2; doubles for each attempt after that.
    pub base_delay: Duration,
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_secs(2) }
    }
}

impl RetrySchedule {
    /// Delay to wait before the given 1-based attempt, or `None` once
    /// the budget is spent. Attempt 1 is the original transmission and
    /// has no delay.
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        if attempt <= 1 {
            return Some(Duration::ZERO);
        }
        if attempt > self.max_attempts {
            return None;
        }
        Some(self.base_delay * 2u32.saturating_pow(attempt - 2))
    }

    pub fn attempts_left(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget_doubles_per_attempt() {
        let schedule = RetrySchedule::default();
        assert_eq!(schedule.delay_before(1), Some(Duration::ZERO));
        assert_eq!(schedule.delay_before(2), Some(Duration::from_secs(2)));
        assert_eq!(schedule.delay_before(3), Some(Duration::from_secs(4)));
        assert_eq!(schedule.delay_before(4), None);
    }

    #[test]
    fn attempts_left_counts_the_original_send() {
        let schedule = RetrySchedule::default();
        assert!(schedule.attempts_left(1));
        assert!(schedule.attempts_left(2));
        assert!(!schedule.attempts_left(3));
    }
}
