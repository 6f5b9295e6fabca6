//! Configuration for the session tracker.

use std::time::Duration;

/// Default maximum number of tracked users.
/// Session states are small; this bounds a long-lived process without
/// evicting active conversations.
pub const DEFAULT_MAX_USERS: usize = 10_000;

/// Default TTL for session state (none — state lives until evicted).
pub const DEFAULT_TTL: Option<Duration> = None;

/// Configuration for the session tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Maximum number of users to track before LRU eviction.
    pub max_users: usize,

    /// Optional time-to-live for session state.
    /// State not touched within this duration is considered gone.
    pub ttl: Option<Duration>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_users: DEFAULT_MAX_USERS,
            ttl: DEFAULT_TTL,
        }
    }
}

impl TrackerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of tracked users.
    pub fn with_max_users(mut self, max: usize) -> Self {
        self.max_users = max;
        self
    }

    /// Set the TTL for session state.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Disable TTL (state does not expire based on time).
    pub fn without_ttl(mut self) -> Self {
        self.ttl = None;
        self
    }
}
