//! Login rate limiter for preventing brute force attacks
//!
//! Failed login attempts are counted per key (username) in a fixed
//! window; too many failures inside the window ban the key for a while.
//! A successful login clears the key. State is process-local by design:
//! an attacker spread across instances still hits the per-instance cap.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of failed attempts inside the window
    pub max_failures: u32,
    /// Counting window
    pub window: Duration,
    /// How long a key stays banned after exceeding the cap
    pub ban_duration: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window: Duration::from_secs(300),
            ban_duration: Duration::from_secs(900),
        }
    }
}

#[derive(Debug)]
struct Entry {
    failures: u32,
    window_start: Instant,
    banned_until: Option<Instant>,
}

/// Per-key login rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether the key may attempt a login right now
    pub async fn check(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let Some(entry) = entries.get_mut(key) else {
            return true;
        };

        if let Some(banned_until) = entry.banned_until {
            if now < banned_until {
                return false;
            }
            entry.failures = 0;
            entry.banned_until = None;
        }

        if now.duration_since(entry.window_start) >= self.config.window {
            entry.failures = 0;
            entry.window_start = now;
        }

        entry.failures < self.config.max_failures
    }

    /// Record a failed attempt for the key
    pub async fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert(Entry {
            failures: 0,
            window_start: now,
            banned_until: None,
        });

        if now.duration_since(entry.window_start) >= self.config.window {
            entry.failures = 0;
            entry.window_start = now;
        }

        entry.failures += 1;
        if entry.failures >= self.config.max_failures && entry.banned_until.is_none() {
            entry.banned_until = Some(now + self.config.ban_duration);
            info!(
                "Login key {} banned for {} seconds",
                key,
                self.config.ban_duration.as_secs()
            );
        }
    }

    /// Clear the key after a successful login
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    /// Get the rate limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_failures: u32) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_failures,
            window: Duration::from_secs(300),
            ban_duration: Duration::from_secs(900),
        })
    }

    #[tokio::test]
    async fn test_ban_after_repeated_failures() {
        let limiter = limiter(3);

        assert!(limiter.check("viewer").await);
        for _ in 0..3 {
            limiter.record_failure("viewer").await;
        }
        assert!(!limiter.check("viewer").await);

        // Other keys are unaffected
        assert!(limiter.check("admin").await);
    }

    #[tokio::test]
    async fn test_reset_clears_failures() {
        let limiter = limiter(2);

        limiter.record_failure("viewer").await;
        limiter.reset("viewer").await;
        limiter.record_failure("viewer").await;
        assert!(limiter.check("viewer").await);
    }
}
