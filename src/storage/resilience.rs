//! Connection retry policy.
//!
//! Bounds how hard the connection manager tries to reach the database:
//! how many attempts, how long each attempt may take, and how long to wait
//! between attempts.
//!
//! # Backoff
//!
//! ```text
//! attempt 1 --fail--> sleep(backoff) --> attempt 2 --fail--> sleep(backoff * m) --> ...
//! ```
//!
//! A multiplier of `1.0` gives a fixed delay. Delays never exceed
//! `max_backoff_ms`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use recvault::storage::RetryPolicy;
//!
//! let policy = RetryPolicy::default()
//!     .with_max_attempts(5)
//!     .with_backoff_multiplier(2.0);
//! ```

use std::time::Duration;

/// Default number of connect attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default delay between connect attempts in milliseconds.
pub const DEFAULT_BACKOFF_MS: u64 = 2_000;
/// Default per-attempt connect timeout in milliseconds.
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 10_000;
/// Default upper bound for the backoff delay in milliseconds.
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 30_000;

/// Retry policy for establishing the database connection.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total connect attempts before giving up (minimum 1).
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    pub backoff_ms: u64,
    /// Growth factor applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
    /// Upper bound for any single delay, in milliseconds.
    pub max_backoff_ms: u64,
    /// Timeout for a single connect attempt, in milliseconds.
    pub attempt_timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_ms: DEFAULT_BACKOFF_MS,
            backoff_multiplier: 1.0,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            attempt_timeout_ms: DEFAULT_ATTEMPT_TIMEOUT_MS,
        }
    }
}

impl RetryPolicy {
    /// Applies overrides from a key lookup.
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(parsed) = parse_var::<u32, _>(&lookup, "RECVAULT_CONNECT_MAX_ATTEMPTS") {
            self.max_attempts = parsed.max(1);
        }
        if let Some(parsed) = parse_var::<u64, _>(&lookup, "RECVAULT_CONNECT_BACKOFF_MS") {
            self.backoff_ms = parsed;
        }
        if let Some(parsed) = parse_var::<f64, _>(&lookup, "RECVAULT_CONNECT_BACKOFF_MULTIPLIER")
        {
            self.backoff_multiplier = parsed.max(1.0);
        }
        if let Some(parsed) = parse_var::<u64, _>(&lookup, "RECVAULT_CONNECT_MAX_BACKOFF_MS") {
            self.max_backoff_ms = parsed;
        }
        if let Some(parsed) = parse_var::<u64, _>(&lookup, "RECVAULT_CONNECT_TIMEOUT_MS") {
            self.attempt_timeout_ms = parsed.max(1);
        }
        self
    }

    /// Sets the number of attempts.
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the base backoff delay in milliseconds.
    #[must_use]
    pub const fn with_backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.backoff_ms = backoff_ms;
        self
    }

    /// Sets the backoff multiplier. `1.0` means a fixed delay.
    #[must_use]
    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Sets the maximum backoff delay in milliseconds.
    #[must_use]
    pub const fn with_max_backoff_ms(mut self, max_backoff_ms: u64) -> Self {
        self.max_backoff_ms = max_backoff_ms;
        self
    }

    /// Sets the per-attempt timeout in milliseconds.
    #[must_use]
    pub const fn with_attempt_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.attempt_timeout_ms = timeout_ms;
        self
    }

    /// Returns the effective attempt budget (never zero).
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Returns the timeout for a single connect attempt.
    #[must_use]
    pub const fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Returns the delay to wait after the given failed attempt (1-based).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.backoff_multiplier.max(1.0).powi(exponent);
        let millis = (self.backoff_ms as f64 * factor).min(self.max_backoff_ms as f64);
        Duration::from_millis(millis.max(0.0) as u64)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff_ms, 2_000);
        assert_eq!(policy.attempt_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_fixed_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
        assert_eq!(policy.delay_after(7), Duration::from_secs(2));
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let policy = RetryPolicy::default()
            .with_backoff_ms(100)
            .with_backoff_multiplier(2.0)
            .with_max_backoff_ms(500);

        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after(3), Duration::from_millis(400));
        assert_eq!(policy.delay_after(4), Duration::from_millis(500));
        assert_eq!(policy.delay_after(40), Duration::from_millis(500));
    }

    #[test]
    fn test_multiplier_below_one_is_fixed() {
        let policy = RetryPolicy::default()
            .with_backoff_ms(300)
            .with_backoff_multiplier(0.5);
        assert_eq!(policy.delay_after(3), Duration::from_millis(300));
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let policy = RetryPolicy::default().with_max_attempts(0);
        assert_eq!(policy.attempts(), 1);
    }

    #[test]
    fn test_overrides_applied() {
        let policy = RetryPolicy::default().with_overrides(lookup_from(&[
            ("RECVAULT_CONNECT_MAX_ATTEMPTS", "5"),
            ("RECVAULT_CONNECT_BACKOFF_MS", "250"),
            ("RECVAULT_CONNECT_BACKOFF_MULTIPLIER", "3"),
            ("RECVAULT_CONNECT_MAX_BACKOFF_MS", "9000"),
            ("RECVAULT_CONNECT_TIMEOUT_MS", "1500"),
        ]));

        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff_ms, 250);
        assert!((policy.backoff_multiplier - 3.0).abs() < f64::EPSILON);
        assert_eq!(policy.max_backoff_ms, 9_000);
        assert_eq!(policy.attempt_timeout_ms, 1_500);
    }

    #[test]
    fn test_invalid_overrides_ignored_and_clamped() {
        let policy = RetryPolicy::default().with_overrides(lookup_from(&[
            ("RECVAULT_CONNECT_MAX_ATTEMPTS", "0"),
            ("RECVAULT_CONNECT_BACKOFF_MS", "soon"),
        ]));

        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.backoff_ms, DEFAULT_BACKOFF_MS);
    }
}
