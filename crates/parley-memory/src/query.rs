//! Query types for memory lookups and recall.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parley_types::MemoryKind;

/// Server-side cap applied before client-side ranking.
pub const QUERY_CAP: usize = 50;

// ─────────────────────────────────────────────────────────────────────────────
// Time Window
// ─────────────────────────────────────────────────────────────────────────────

/// Time window filter for memory queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeWindow {
    /// Last 24 hours.
    Day,
    /// Last 7 days.
    Week,
    /// Last 30 days.
    Month,
    /// All time (no filter).
    #[default]
    All,
}

impl TimeWindow {
    /// Cutoff datetime for this window relative to `now`.
    pub fn cutoff_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        use chrono::Duration;
        match self {
            Self::Day => Some(now - Duration::days(1)),
            Self::Week => Some(now - Duration::days(7)),
            Self::Month => Some(now - Duration::days(30)),
            Self::All => None,
        }
    }

    /// Cutoff datetime relative to the current time.
    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.cutoff_from(Utc::now())
    }

    /// Stable string form, used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::All => "all",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Query
// ─────────────────────────────────────────────────────────────────────────────

/// Filtered lookup against a memory backend.
///
/// Results come back ordered by recency (newest `created_at` first), capped
/// at [`QUERY_CAP`] rows before client-side ranking.
#[derive(Debug, Clone)]
pub struct MemoryQuery {
    /// Agent whose memories to search.
    pub agent_id: String,
    /// Optional user scoping.
    pub user_id: Option<String>,
    /// Kind filters (empty = all kinds).
    pub kinds: Vec<MemoryKind>,
    /// Time window filter.
    pub time_window: TimeWindow,
    /// Row cap. Defaults to [`QUERY_CAP`].
    pub limit: usize,
}

impl MemoryQuery {
    /// Create a query for an agent's memories.
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            user_id: None,
            kinds: Vec::new(),
            time_window: TimeWindow::All,
            limit: QUERY_CAP,
        }
    }

    /// Scope to a specific user.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Add a kind filter.
    pub fn with_kind(mut self, kind: MemoryKind) -> Self {
        self.kinds.push(kind);
        self
    }

    /// Replace the kind filters.
    pub fn with_kinds(mut self, kinds: Vec<MemoryKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Set the time window filter.
    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = window;
        self
    }

    /// Set the row cap (clamped to [`QUERY_CAP`]).
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(QUERY_CAP);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stats Types
// ─────────────────────────────────────────────────────────────────────────────

/// Statistics about a memory store tier.
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    /// Total entries stored.
    pub total: usize,
    /// Entry counts broken down by kind.
    pub by_kind: HashMap<MemoryKind, usize>,
}

impl StoreStats {
    /// Count for a single kind (0 when absent).
    pub fn kind_count(&self, kind: MemoryKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}
