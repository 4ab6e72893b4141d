use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;

/// Delay policy applied before a retried attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry; doubled for each later one.
    pub base: Duration,
    /// Upper bound (exclusive) of the random jitter added to computed delays.
    pub max_jitter: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(200),
            max_jitter: Duration::from_millis(100),
        }
    }
}

impl BackoffPolicy {
    /// Returns the wait before the retry that follows `attempt`.
    ///
    /// A parsable `Retry-After` hint wins over the exponential schedule.
    pub fn delay(&self, attempt: u32, retry_after: Option<&str>) -> Duration {
        retry_after
            .and_then(|value| parse_retry_after(value, Utc::now()))
            .unwrap_or_else(|| self.exponential(attempt) + self.jitter())
    }

    /// `base * 2^attempt`, saturating.
    pub fn exponential(&self, attempt: u32) -> Duration {
        let exp = attempt.min(16);
        self.base.saturating_mul(1u32 << exp)
    }

    fn jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
    }
}

/// Parses a `Retry-After` header value relative to `now`.
///
/// Accepts a number of seconds (fractions allowed, negatives clamp to zero) or
/// an HTTP date. Dates in the past yield zero. Anything else is `None`.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(seconds) = value.parse::<f64>() {
        if !seconds.is_finite() {
            return None;
        }
        let millis = (seconds * 1000.0).floor().max(0.0);
        return Some(Duration::from_millis(millis as u64));
    }

    let date = DateTime::parse_from_rfc2822(value).ok()?;
    let millis = date
        .with_timezone(&Utc)
        .signed_duration_since(now)
        .num_milliseconds()
        .max(0);
    Some(Duration::from_millis(millis as u64))
}
