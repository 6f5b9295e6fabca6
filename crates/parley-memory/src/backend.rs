//! Memory backend trait for pluggable storage.
//!
//! The engine defines a storage *contract*, not a storage technology. The
//! default deployment composes a SQLite primary tier with a JSONL file
//! fallback (see [`crate::fallback::FallbackStore`]), but anything that
//! implements [`MemoryBackend`] can be injected.

use parley_types::{Id, MemoryEntry};

use crate::error::Result;
use crate::query::{MemoryQuery, StoreStats};

/// Trait for memory storage backends.
///
/// Inserts are append-only; entries are never mutated after creation except
/// through [`MemoryBackend::touch`], which records a successful recall.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow sharing across
/// concurrent user turns.
pub trait MemoryBackend: Send + Sync {
    /// Insert a new memory entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be persisted (e.g., storage
    /// unreachable). Callers that must not surface storage failures wrap the
    /// backend in a [`crate::fallback::FallbackStore`].
    fn insert(&self, entry: &MemoryEntry) -> Result<()>;

    /// Query entries matching the given filters.
    ///
    /// Results are ordered by `created_at` descending (newest first) and
    /// capped at the query's limit.
    fn query(&self, query: &MemoryQuery) -> Result<Vec<MemoryEntry>>;

    /// Record a successful recall of an entry: bumps `frequency` and sets
    /// `last_accessed` to now.
    fn touch(&self, id: Id) -> Result<()>;

    /// Count stored entries, optionally filtered by agent.
    fn count(&self, agent_id: Option<&str>) -> Result<usize>;

    /// Get store statistics: total entries and counts per kind.
    fn stats(&self) -> Result<StoreStats>;
}

/// Mock memory backend for testing.
///
/// Stores entries in a HashMap behind a Mutex; no persistence.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockBackend {
    entries: std::sync::Mutex<std::collections::HashMap<Id, MemoryEntry>>,
    /// When set, every operation fails with a storage error.
    pub fail: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let backend = Self::default();
        backend.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        backend
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            Err(crate::error::MemoryError::Storage(
                "mock backend unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[cfg(test)]
impl MemoryBackend for MockBackend {
    fn insert(&self, entry: &MemoryEntry) -> Result<()> {
        self.check()?;
        self.entries.lock().unwrap().insert(entry.id, entry.clone());
        Ok(())
    }

    fn query(&self, query: &MemoryQuery) -> Result<Vec<MemoryEntry>> {
        self.check()?;
        let map = self.entries.lock().unwrap();
        let cutoff = query.time_window.cutoff();

        let mut results: Vec<_> = map
            .values()
            .filter(|e| e.agent_id == query.agent_id)
            .filter(|e| query.user_id.is_none() || e.user_id == query.user_id)
            .filter(|e| query.kinds.is_empty() || query.kinds.contains(&e.kind))
            .filter(|e| cutoff.is_none_or(|c| e.created_at >= c))
            .cloned()
            .collect();

        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results.truncate(query.limit);
        Ok(results)
    }

    fn touch(&self, id: Id) -> Result<()> {
        self.check()?;
        let mut map = self.entries.lock().unwrap();
        let entry = map
            .get_mut(&id)
            .ok_or_else(|| crate::error::MemoryError::NotFound(format!("Entry {}", id)))?;
        entry.frequency += 1;
        entry.last_accessed = chrono::Utc::now();
        Ok(())
    }

    fn count(&self, agent_id: Option<&str>) -> Result<usize> {
        self.check()?;
        let map = self.entries.lock().unwrap();
        Ok(map
            .values()
            .filter(|e| agent_id.is_none_or(|a| e.agent_id == a))
            .count())
    }

    fn stats(&self) -> Result<StoreStats> {
        self.check()?;
        let map = self.entries.lock().unwrap();
        let mut stats = StoreStats {
            total: map.len(),
            ..StoreStats::default()
        };
        for entry in map.values() {
            *stats.by_kind.entry(entry.kind).or_insert(0) += 1;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::MemoryKind;

    #[test]
    fn test_mock_insert_and_query() {
        let backend = MockBackend::new();

        let entry = MemoryEntry::new("tutor", MemoryKind::Summary, "input", "summary")
            .with_user("user-1");
        backend.insert(&entry).unwrap();

        let query = MemoryQuery::new("tutor").with_user("user-1");
        let results = backend.query(&query).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, entry.id);
    }

    #[test]
    fn test_mock_kind_filter() {
        let backend = MockBackend::new();
        backend
            .insert(&MemoryEntry::new("tutor", MemoryKind::Goal, "a", "b"))
            .unwrap();
        backend
            .insert(&MemoryEntry::new("tutor", MemoryKind::Log, "c", "d"))
            .unwrap();

        let query = MemoryQuery::new("tutor").with_kind(MemoryKind::Goal);
        let results = backend.query(&query).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, MemoryKind::Goal);
    }

    #[test]
    fn test_mock_touch_bumps_frequency() {
        let backend = MockBackend::new();
        let entry = MemoryEntry::new("tutor", MemoryKind::Summary, "a", "b");
        backend.insert(&entry).unwrap();

        backend.touch(entry.id).unwrap();
        backend.touch(entry.id).unwrap();

        let results = backend.query(&MemoryQuery::new("tutor")).unwrap();
        assert_eq!(results[0].frequency, 3);
        assert!(results[0].last_accessed >= results[0].created_at);
    }

    #[test]
    fn test_mock_failing_backend() {
        let backend = MockBackend::failing();
        let entry = MemoryEntry::new("tutor", MemoryKind::Summary, "a", "b");
        assert!(backend.insert(&entry).is_err());
        assert!(backend.query(&MemoryQuery::new("tutor")).is_err());
    }
}
