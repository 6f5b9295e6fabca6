//! Per-user session state tracker with LRU eviction and TTL support.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use parley_types::{ReasoningLevel, SessionState};

use crate::config::TrackerConfig;

/// A session state plus the instant it was last written or read.
///
/// Expiry rides on the entry itself instead of a side table, so an LRU
/// eviction can never leave a stale timer behind.
struct TrackedState {
    state: SessionState,
    touched_at: Instant,
}

impl TrackedState {
    fn expired(&self, config: &TrackerConfig) -> bool {
        config.ttl.is_some_and(|ttl| self.touched_at.elapsed() > ttl)
    }
}

/// Inner state protected by RwLock.
struct TrackerInner {
    /// LRU map from user ID to their last-turn state and TTL timer.
    states: LruCache<String, TrackedState>,
}

/// Process-wide mapping from user identifier to session state.
///
/// - `set_last_response` overwrites unconditionally; overlapping writes for
///   the same user are serialized by the write lock, so the newest complete
///   state wins and no fields are torn.
/// - Reads clone the state out, so different users' turns never hold each
///   other up beyond the brief map lock.
/// - The map is bounded by LRU eviction plus an optional TTL, so a long-lived
///   process does not grow without limit.
pub struct SessionTracker {
    inner: Arc<RwLock<TrackerInner>>,
    config: TrackerConfig,
}

impl SessionTracker {
    /// Create a new tracker.
    pub fn new(config: TrackerConfig) -> Self {
        let cap =
            NonZeroUsize::new(config.max_users).unwrap_or_else(|| NonZeroUsize::new(1).unwrap());

        let inner = TrackerInner {
            states: LruCache::new(cap),
        };

        Self {
            inner: Arc::new(RwLock::new(inner)),
            config,
        }
    }

    /// Get the tracker configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Record the outcome of a user's turn, overwriting any prior state.
    pub async fn set_last_response(
        &self,
        user_id: &str,
        agent_id: &str,
        response: &str,
        reasoning_level: ReasoningLevel,
        continuation_context: Option<String>,
    ) {
        let mut state = SessionState::new(agent_id, response, reasoning_level);
        if let Some(ctx) = continuation_context {
            state = state.with_continuation(ctx);
        }

        let mut inner = self.inner.write().await;
        inner.states.put(
            user_id.to_string(),
            TrackedState {
                state,
                touched_at: Instant::now(),
            },
        );

        trace!(
            user_id = %user_id,
            agent_id = %agent_id,
            tracked = inner.states.len(),
            "Session state recorded"
        );
    }

    /// Get the user's last-turn state, if present and not expired.
    ///
    /// Marks the state as recently used and resets its TTL timer.
    pub async fn get_last_response(&self, user_id: &str) -> Option<SessionState> {
        let mut inner = self.inner.write().await;

        let expired = inner
            .states
            .peek(user_id)
            .is_some_and(|tracked| tracked.expired(&self.config));
        if expired {
            debug!(user_id = %user_id, "Session state expired, removing");
            inner.states.pop(user_id);
            return None;
        }

        inner.states.get_mut(user_id).map(|tracked| {
            tracked.touched_at = Instant::now();
            tracked.state.clone()
        })
    }

    /// Peek at a user's state without updating LRU order or TTL.
    pub async fn peek(&self, user_id: &str) -> Option<SessionState> {
        let inner = self.inner.read().await;
        inner
            .states
            .peek(user_id)
            .filter(|tracked| !tracked.expired(&self.config))
            .map(|tracked| tracked.state.clone())
    }

    /// Drop a user's state.
    pub async fn invalidate(&self, user_id: &str) {
        let mut inner = self.inner.write().await;
        if inner.states.pop(user_id).is_some() {
            debug!(user_id = %user_id, "Session state invalidated");
        }
    }

    /// Clean up expired state. Returns the number of users removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.write().await;

        let expired: Vec<String> = inner
            .states
            .iter()
            .filter(|(_, tracked)| tracked.expired(&self.config))
            .map(|(user_id, _)| user_id.clone())
            .collect();
        let count = expired.len();

        for user_id in &expired {
            inner.states.pop(user_id);
        }

        if count > 0 {
            debug!(count = count, "Cleaned up expired session state");
        }
        count
    }

    /// Number of tracked users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.states.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.states.is_empty()
    }

    /// Tracker statistics.
    pub async fn stats(&self) -> TrackerStats {
        let inner = self.inner.read().await;
        let live = inner
            .states
            .iter()
            .filter(|(_, tracked)| !tracked.expired(&self.config))
            .count();
        TrackerStats {
            tracked: inner.states.len(),
            capacity: self.config.max_users,
            live,
        }
    }
}

impl Clone for SessionTracker {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
        }
    }
}

/// Tracker statistics.
#[derive(Debug, Clone)]
pub struct TrackerStats {
    /// Current number of tracked users, expired entries included.
    pub tracked: usize,

    /// Maximum capacity.
    pub capacity: usize,

    /// Tracked users whose state is still within the TTL.
    pub live: usize,
}
