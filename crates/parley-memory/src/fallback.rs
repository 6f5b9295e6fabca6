//! Two-tier store composition with a documented fallback contract.
//!
//! The primary tier (normally SQLite) takes every operation first. When it
//! fails, inserts are retried best-effort against the secondary tier
//! (normally a JSONL file store) and queries degrade through the secondary
//! to an empty result. Nothing on this path ever raises to the planner; every
//! swallowed failure is logged with enough context to diagnose.

use std::sync::Arc;

use tracing::warn;

use parley_types::{Id, MemoryEntry};

use crate::backend::MemoryBackend;
use crate::error::Result;
use crate::query::{MemoryQuery, StoreStats};

/// Two-tier memory store: primary with best-effort secondary fallback.
pub struct FallbackStore {
    primary: Arc<dyn MemoryBackend>,
    secondary: Arc<dyn MemoryBackend>,
}

impl FallbackStore {
    /// Compose a primary and a secondary backend.
    pub fn new(primary: Arc<dyn MemoryBackend>, secondary: Arc<dyn MemoryBackend>) -> Self {
        Self { primary, secondary }
    }

    /// Insert an entry, falling back to the secondary tier on failure.
    ///
    /// Never fails: a double failure is logged and swallowed, since losing
    /// one memory entry must not abort the user-facing turn.
    pub fn insert(&self, entry: &MemoryEntry) {
        if let Err(primary_err) = self.primary.insert(entry) {
            warn!(
                entry_id = %entry.id,
                agent_id = %entry.agent_id,
                error = %primary_err,
                "Primary store insert failed, falling back to secondary"
            );
            if let Err(secondary_err) = self.secondary.insert(entry) {
                warn!(
                    entry_id = %entry.id,
                    agent_id = %entry.agent_id,
                    error = %secondary_err,
                    "Secondary store insert failed, entry dropped"
                );
            }
        }
    }

    /// Query entries, degrading through the secondary tier to empty.
    pub fn query(&self, query: &MemoryQuery) -> Vec<MemoryEntry> {
        match self.primary.query(query) {
            Ok(entries) => entries,
            Err(primary_err) => {
                warn!(
                    agent_id = %query.agent_id,
                    error = %primary_err,
                    "Primary store query failed, falling back to secondary"
                );
                match self.secondary.query(query) {
                    Ok(entries) => entries,
                    Err(secondary_err) => {
                        warn!(
                            agent_id = %query.agent_id,
                            error = %secondary_err,
                            "Secondary store query failed, returning empty"
                        );
                        Vec::new()
                    }
                }
            }
        }
    }

    /// Record a recall best-effort against both tiers.
    ///
    /// Whichever tier holds the entry gets the bump; a miss on either tier
    /// is expected (entries written during an outage live only in one tier).
    pub fn touch(&self, id: Id) {
        let primary_hit = self.primary.touch(id).is_ok();
        if !primary_hit && self.secondary.touch(id).is_err() {
            warn!(entry_id = %id, "Recall touch missed both store tiers");
        }
    }

    /// Count entries in the primary tier, degrading to the secondary.
    pub fn count(&self, agent_id: Option<&str>) -> Result<usize> {
        match self.primary.count(agent_id) {
            Ok(count) => Ok(count),
            Err(_) => self.secondary.count(agent_id),
        }
    }

    /// Statistics from the primary tier, degrading to the secondary.
    pub fn stats(&self) -> Result<StoreStats> {
        match self.primary.stats() {
            Ok(stats) => Ok(stats),
            Err(_) => self.secondary.stats(),
        }
    }
}

impl std::fmt::Debug for FallbackStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackStore").finish_non_exhaustive()
    }
}
