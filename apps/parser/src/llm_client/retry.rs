use std::time::Duration;

/// Bounded retry with exponential backoff for the plain-text
/// generation path.
///
/// An explicit value rather than a wrapper so tests can inject a
/// zero-delay policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(400),
            multiplier: 2.0,
            cap: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Same attempt bounds, no waiting. For tests.
    pub fn zero_delay() -> Self {
        Self {
            base_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Backoff before the attempt following `completed_attempts`.
    pub fn delay(&self, completed_attempts: u32) -> Duration {
        let exponent = completed_attempts.saturating_sub(1).min(16) as i32;
        let delay = self.base_delay.mul_f64(self.multiplier.powi(exponent));
        delay.min(self.cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_sequence() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_millis(400));
        assert_eq!(policy.delay(2), Duration::from_millis(800));
        assert_eq!(policy.delay(3), Duration::from_millis(1600));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(10), Duration::from_secs(2));
    }

    #[test]
    fn test_zero_delay_policy_never_sleeps() {
        let policy = RetryPolicy::zero_delay();
        assert_eq!(policy.delay(1), Duration::ZERO);
        assert_eq!(policy.delay(5), Duration::ZERO);
        assert_eq!(policy.max_attempts, RetryPolicy::default().max_attempts);
    }
}
