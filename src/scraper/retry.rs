//! Retry policy for fetch workers

use clap::ValueEnum;
use std::time::Duration;

/// Default delay after a rate-limited response
const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

/// Default ceiling for exponential backoff
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// How the rate-limit delay grows across repeated 429 responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backoff {
    /// Always wait `rate_limit_delay`
    #[default]
    Fixed,
    /// Double the delay on every further 429, up to `max_delay`
    Exponential,
}

/// Retry behaviour of a fetch worker
///
/// The default retries forever, sleeps a fixed second on 429 and retries
/// transport failures immediately with a fresh proxy. With that default, a list
/// whose lines validate but can never connect (port 65536, dead hosts) makes the
/// worker re-draw in a tight loop; set `transport_delay` or `max_attempts` to bound it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts per identifier, `None` for unbounded
    pub max_attempts: Option<u32>,
    /// Base delay after a 429 response
    pub rate_limit_delay: Duration,
    /// Delay after a transport failure
    pub transport_delay: Duration,
    pub backoff: Backoff,
    /// Ceiling for exponential backoff
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
            transport_delay: Duration::ZERO,
            backoff: Backoff::Fixed,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    pub fn with_transport_delay(mut self, delay: Duration) -> Self {
        self.transport_delay = delay;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Whether the 1-based `attempt` may still be made
    pub fn allows_attempt(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt <= max)
    }

    /// Delay before retrying after the `rate_limited`-th 429 for one identifier
    pub fn rate_limit_delay_for(&self, rate_limited: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.rate_limit_delay,
            Backoff::Exponential => {
                let shift = rate_limited.saturating_sub(1).min(31);
                self.rate_limit_delay
                    .saturating_mul(1u32 << shift)
                    .min(self.max_delay)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_unbounded() {
        let policy = RetryPolicy::default();
        assert!(policy.allows_attempt(1));
        assert!(policy.allows_attempt(u32::MAX));
        assert_eq!(policy.rate_limit_delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.rate_limit_delay_for(10), Duration::from_secs(1));
        assert_eq!(policy.transport_delay, Duration::ZERO);
    }

    #[test]
    fn test_attempt_cap() {
        let policy = RetryPolicy::new().with_max_attempts(Some(3));
        assert!(policy.allows_attempt(3));
        assert!(!policy.allows_attempt(4));
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let policy = RetryPolicy::new()
            .with_backoff(Backoff::Exponential)
            .with_rate_limit_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(3));

        assert_eq!(policy.rate_limit_delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.rate_limit_delay_for(2), Duration::from_secs(1));
        assert_eq!(policy.rate_limit_delay_for(3), Duration::from_secs(2));
        assert_eq!(policy.rate_limit_delay_for(4), Duration::from_secs(3));
        assert_eq!(policy.rate_limit_delay_for(100), Duration::from_secs(3));
    }
}
