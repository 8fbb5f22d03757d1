use reqwest::StatusCode;
use std::time::Duration;

/// Bounded fixed-delay retry for transient upstream failures.
///
/// The predicate decides which statuses are worth another attempt; any other
/// non-success status fails the call on the spot. Swapping the delay strategy
/// (e.g. for backoff) only touches this type, not the call sites.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub retryable: fn(StatusCode) -> bool,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            retryable: |status| status == StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl Default for RetryPolicy {
    /// Cristin signals overload with 503; three attempts, three seconds apart.
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(3))
    }
}
