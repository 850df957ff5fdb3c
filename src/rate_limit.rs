/// Rate limiting for votes, poll creation and account actions
///
/// Implements sliding window rate limiting using in-memory storage (DashMap).
/// This is suitable for single-instance deployments.
///
/// Limits are read from [`crate::app_config::RateLimitConfig`].
///
/// # Example Usage
///
/// ```rust,ignore
/// use crate::rate_limit::check_vote_rate_limit;
///
/// if let Err(e) = check_vote_rate_limit("192.168.1.1") {
///     // tell the client to retry after e.retry_after_seconds
/// }
/// ```
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global rate limiter instance
pub static RATE_LIMITER: Lazy<Arc<RateLimiter>> = Lazy::new(|| Arc::new(RateLimiter::new()));

/// Rate limiter using in-memory storage
pub struct RateLimiter {
    /// Map of (action_type:identifier) -> Request timestamps
    requests: DashMap<String, Vec<Instant>>,
}

/// Error returned when rate limit is exceeded
#[derive(Debug, Clone)]
pub struct RateLimitError {
    /// Number of seconds until the rate limit resets
    pub retry_after_seconds: u64,
}

impl std::fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Too many requests. Try again in {} seconds.",
            self.retry_after_seconds
        )
    }
}

impl std::error::Error for RateLimitError {}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
        }
    }

    /// Check if a request should be rate limited
    ///
    /// # Arguments
    /// * `action` - The action being rate limited (e.g., "vote", "login")
    /// * `identifier` - Unique identifier for the requester (e.g., IP address, user ID)
    /// * `max_requests` - Maximum number of requests allowed in the window
    /// * `window` - Time window for the rate limit
    pub fn check_rate_limit(
        &self,
        action: &str,
        identifier: &str,
        max_requests: usize,
        window: Duration,
    ) -> Result<(), RateLimitError> {
        let key = format!("{}:{}", action, identifier);
        let now = Instant::now();

        let mut entry = self.requests.entry(key).or_default();

        // Sliding window
        entry.retain(|&timestamp| now.duration_since(timestamp) < window);

        if entry.len() >= max_requests {
            let retry_after = match entry.first() {
                Some(oldest) => window.saturating_sub(now.duration_since(*oldest)),
                None => window,
            };

            return Err(RateLimitError {
                retry_after_seconds: retry_after.as_secs() + 1, // Round up
            });
        }

        entry.push(now);

        Ok(())
    }

    /// Drop keys whose timestamps have all expired.
    ///
    /// Called periodically by the server binary.
    pub fn cleanup_old_entries(&self, max_window: Duration) {
        let now = Instant::now();
        self.requests.retain(|_, timestamps| {
            timestamps.retain(|&timestamp| now.duration_since(timestamp) < max_window);
            !timestamps.is_empty()
        });
    }

    /// Clear all requests for a specific action/identifier
    pub fn clear_requests(&self, action: &str, identifier: &str) {
        let key = format!("{}:{}", action, identifier);
        self.requests.remove(&key);
    }

    /// Get the number of tracked keys
    pub fn tracked_keys_count(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn window(seconds: u32) -> Duration {
    Duration::from_secs(seconds as u64)
}

/// Votes per client address.
pub fn check_vote_rate_limit(ip: &str) -> Result<(), RateLimitError> {
    let config = crate::app_config::rate_limit();
    RATE_LIMITER.check_rate_limit(
        "vote",
        ip,
        config.vote_max_requests as usize,
        window(config.vote_window_seconds),
    )
}

/// Poll creations per user.
pub fn check_poll_creation_rate_limit(user_id: i32) -> Result<(), RateLimitError> {
    let config = crate::app_config::rate_limit();
    RATE_LIMITER.check_rate_limit(
        "poll_creation",
        &user_id.to_string(),
        config.poll_creation_max_requests as usize,
        window(config.poll_creation_window_seconds),
    )
}

/// Login attempts per client address.
pub fn check_login_rate_limit(ip: &str) -> Result<(), RateLimitError> {
    let config = crate::app_config::rate_limit();
    RATE_LIMITER.check_rate_limit(
        "login",
        ip,
        config.login_max_attempts as usize,
        window(config.login_window_seconds),
    )
}

/// Registrations per client address.
pub fn check_registration_rate_limit(ip: &str) -> Result<(), RateLimitError> {
    let config = crate::app_config::rate_limit();
    RATE_LIMITER.check_rate_limit(
        "registration",
        ip,
        config.registration_max_requests as usize,
        window(config.registration_window_seconds),
    )
}

/// Periodic cleanup entry point for the server binary.
pub fn cleanup_old_entries_public() {
    let config = crate::app_config::rate_limit();
    let longest = [
        config.vote_window_seconds,
        config.poll_creation_window_seconds,
        config.login_window_seconds,
        config.registration_window_seconds,
    ]
    .into_iter()
    .max()
    .unwrap_or(3600);
    RATE_LIMITER.cleanup_old_entries(window(longest));
}
