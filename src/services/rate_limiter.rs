//! Rate limiter for login attempts
//!
//! Limits failed login attempts to five per identifier within a rolling
//! one-hour window. Successful logins clear the identifier's counter.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maximum failed attempts inside the window
const MAX_FAILED_ATTEMPTS: usize = 5;
/// Rolling window length in minutes
const WINDOW_MINUTES: i64 = 60;

/// Login rate limiter keyed by identifier (lowercased email).
pub struct LoginRateLimiter {
    attempts: Arc<RwLock<HashMap<String, Vec<DateTime<Utc>>>>>,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check if the identifier is blocked.
    pub async fn is_limited(&self, identifier: &str) -> bool {
        self.is_limited_at(identifier, Utc::now()).await
    }

    /// Check against an explicit clock, for window tests.
    pub async fn is_limited_at(&self, identifier: &str, now: DateTime<Utc>) -> bool {
        let mut attempts = self.attempts.write().await;
        let cutoff = now - Duration::minutes(WINDOW_MINUTES);

        let entry = attempts.entry(identifier.to_lowercase()).or_default();
        entry.retain(|time| *time > cutoff);

        entry.len() >= MAX_FAILED_ATTEMPTS
    }

    /// Record a failed attempt for the identifier.
    pub async fn record_failure(&self, identifier: &str) {
        self.record_failure_at(identifier, Utc::now()).await;
    }

    pub async fn record_failure_at(&self, identifier: &str, when: DateTime<Utc>) {
        let mut attempts = self.attempts.write().await;
        attempts
            .entry(identifier.to_lowercase())
            .or_default()
            .push(when);
    }

    /// Clear the identifier's counter (on successful login).
    pub async fn clear(&self, identifier: &str) {
        let mut attempts = self.attempts.write().await;
        attempts.remove(&identifier.to_lowercase());
    }

    /// Drop identifiers whose entries all fell out of the window.
    /// Called periodically from a background task.
    pub async fn cleanup(&self) {
        let cutoff = Utc::now() - Duration::minutes(WINDOW_MINUTES);
        let mut attempts = self.attempts.write().await;
        attempts.retain(|_, times| {
            times.retain(|time| *time > cutoff);
            !times.is_empty()
        });
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Fewer than five failures never limit; five or more inside the
        /// window always do.
        #[test]
        fn property_threshold_is_exact(failures in 0usize..10) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result: Result<(), TestCaseError> = rt.block_on(async {
                let limiter = LoginRateLimiter::new();
                let now = Utc::now();
                for _ in 0..failures {
                    limiter.record_failure_at("id@gmail.com", now).await;
                }
                prop_assert_eq!(
                    limiter.is_limited_at("id@gmail.com", now).await,
                    failures >= 5
                );
                Ok(())
            });
            result?;
        }
    }
}
