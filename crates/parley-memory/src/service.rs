//! Recall and remember surface over the two-tier store.
//!
//! `MemoryService` runs the full recall pipeline: backend query → client-side
//! ranking → pattern extraction → cache, and assembles the [`MemoryContext`]
//! handed to the planner. Recall never fails; storage trouble degrades to an
//! empty context.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::debug;

use parley_types::{MemoryContext, MemoryEntry, MemoryKind, MemoryPattern};

use crate::backend::MemoryBackend;
use crate::cache::{RecallCache, RecallKey};
use crate::fallback::FallbackStore;
use crate::query::{MemoryQuery, QUERY_CAP, StoreStats, TimeWindow};
use crate::ranker::{MatchingMode, RankOptions, rank};

/// Default number of entries returned from a recall.
pub const DEFAULT_RECALL_LIMIT: usize = 10;

/// A theme must recur in at least this many entries to become a pattern.
const PATTERN_MIN_FREQUENCY: u32 = 2;

/// Maximum number of extracted patterns per recall.
const PATTERN_CAP: usize = 5;

/// Words shorter than this are not considered theme candidates.
const PATTERN_MIN_WORD_LEN: usize = 5;

// ─────────────────────────────────────────────────────────────────────────────
// Recall Options
// ─────────────────────────────────────────────────────────────────────────────

/// Options for a recall.
#[derive(Debug, Clone)]
pub struct RecallOptions {
    /// Topic to rank against.
    pub topic: Option<String>,
    /// Optional session scoping, part of the cache key.
    pub session_id: Option<String>,
    pub matching: MatchingMode,
    pub min_confidence: f32,
    pub tag_filter: Vec<String>,
    pub time_window: TimeWindow,
    /// Kinds to recall. Defaults to goals and summaries.
    pub kinds: Vec<MemoryKind>,
    /// Maximum entries returned after ranking.
    pub limit: usize,
}

impl Default for RecallOptions {
    fn default() -> Self {
        Self {
            topic: None,
            session_id: None,
            matching: MatchingMode::Fuzzy,
            min_confidence: 0.0,
            tag_filter: Vec::new(),
            time_window: TimeWindow::All,
            kinds: vec![MemoryKind::Goal, MemoryKind::Summary],
            limit: DEFAULT_RECALL_LIMIT,
        }
    }
}

impl RecallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_matching(mut self, mode: MatchingMode) -> Self {
        self.matching = mode;
        self
    }

    pub fn with_min_confidence(mut self, min: f32) -> Self {
        self.min_confidence = min.clamp(0.0, 1.0);
        self
    }

    pub fn with_tag_filter(mut self, tags: Vec<String>) -> Self {
        self.tag_filter = tags;
        self
    }

    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = window;
        self
    }

    pub fn with_kinds(mut self, kinds: Vec<MemoryKind>) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    fn cache_key(&self, agent_id: &str, user_id: Option<&str>) -> RecallKey {
        RecallKey {
            agent_id: agent_id.to_string(),
            user_id: user_id.map(str::to_string),
            session_id: self.session_id.clone(),
            topic: self.topic.as_ref().map(|t| t.to_lowercase()),
            matching: self.matching.as_str(),
            min_confidence_milli: (self.min_confidence * 1000.0).round() as u32,
            limit: self.limit,
            time_window: self.time_window.as_str(),
            tag_filter: self.tag_filter.clone(),
            kinds: self.kinds.iter().map(MemoryKind::as_str).collect(),
        }
        .normalize()
    }

    fn rank_options(&self) -> RankOptions {
        RankOptions {
            topic: self.topic.clone(),
            matching: self.matching,
            min_confidence: self.min_confidence,
            tag_filter: self.tag_filter.clone(),
            time_window: self.time_window,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Service
// ─────────────────────────────────────────────────────────────────────────────

/// Memory recall/remember service: two-tier store + ranker + recall cache.
///
/// One instance per process, constructor-injected into the engine; tests
/// create fresh instances with in-memory backends.
pub struct MemoryService {
    store: FallbackStore,
    cache: RecallCache,
}

impl MemoryService {
    /// Create a service over an already-composed two-tier store.
    pub fn new(store: FallbackStore) -> Self {
        Self {
            store,
            cache: RecallCache::default(),
        }
    }

    /// Create a service with an explicit cache (tests tune TTL/capacity).
    pub fn with_cache(store: FallbackStore, cache: RecallCache) -> Self {
        Self { store, cache }
    }

    /// Compose a service from primary and secondary backends.
    pub fn from_backends(
        primary: Arc<dyn MemoryBackend>,
        secondary: Arc<dyn MemoryBackend>,
    ) -> Self {
        Self::new(FallbackStore::new(primary, secondary))
    }

    /// Recall ranked memories for an agent/user pair.
    ///
    /// Never fails: storage errors degrade to an empty context, and a cache
    /// hit inside the TTL skips the store and the ranker entirely.
    pub fn recall(
        &self,
        agent_id: &str,
        user_id: Option<&str>,
        options: &RecallOptions,
    ) -> MemoryContext {
        let start = Instant::now();
        let key = options.cache_key(agent_id, user_id);

        if let Some(context) = self.cache.get(&key) {
            return context;
        }

        let mut query = MemoryQuery::new(agent_id)
            .with_kinds(options.kinds.clone())
            .with_time_window(options.time_window)
            .with_limit(QUERY_CAP);
        if let Some(user) = user_id {
            query = query.with_user(user);
        }

        let fetched = self.store.query(&query);
        let ranked = rank(fetched, &options.rank_options(), Utc::now());

        let total_matches = ranked.len();
        let mut entries = ranked;
        entries.truncate(options.limit);

        // Successful recall counts as an access on every returned entry.
        for entry in &entries {
            self.store.touch(entry.id);
        }

        let average_relevance = if entries.is_empty() {
            0.0
        } else {
            entries
                .iter()
                .map(|e| e.relevance_score.unwrap_or(0.0))
                .sum::<f32>()
                / entries.len() as f32
        };

        let patterns = extract_patterns(&entries);

        let context = MemoryContext {
            entries,
            total_matches,
            average_relevance,
            patterns,
            cache_hit: false,
            query_time_ms: start.elapsed().as_millis() as u64,
        };

        debug!(
            agent_id = %agent_id,
            matches = total_matches,
            returned = context.entries.len(),
            "Recall served from store"
        );

        self.cache.insert(key, context.clone());
        context
    }

    /// Persist a new memory entry through the fallback path.
    ///
    /// Storage failures are absorbed by the two-tier store; the constructed
    /// entry is always returned so the caller can reference it.
    #[allow(clippy::too_many_arguments)]
    pub fn remember(
        &self,
        agent_id: &str,
        user_id: Option<&str>,
        input: &str,
        summary: &str,
        context: Option<&str>,
        kind: MemoryKind,
        tags: Vec<String>,
    ) -> MemoryEntry {
        let mut entry = MemoryEntry::new(agent_id, kind, input, summary).with_tags(tags);
        if let Some(user) = user_id {
            entry = entry.with_user(user);
        }
        if let Some(ctx) = context {
            entry = entry.with_context(ctx);
        }

        self.store.insert(&entry);
        entry
    }

    /// Persist an already-built entry (goal records carry extra fields).
    pub fn remember_entry(&self, entry: &MemoryEntry) {
        self.store.insert(entry);
    }

    /// Count stored entries for an agent.
    pub fn count(&self, agent_id: Option<&str>) -> usize {
        self.store.count(agent_id).unwrap_or(0)
    }

    /// Store statistics (total entries and counts per kind). Degrades to
    /// empty stats when both tiers are down.
    pub fn stats(&self) -> StoreStats {
        self.store.stats().unwrap_or_default()
    }

    /// Access the recall cache (tests assert hit/miss behavior).
    pub fn cache(&self) -> &RecallCache {
        &self.cache
    }
}

impl std::fmt::Debug for MemoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryService").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pattern Extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Extract recurring themes from recalled entries.
///
/// Tags and long words from summaries are theme candidates; a candidate must
/// recur across entries to surface as a pattern.
fn extract_patterns(entries: &[MemoryEntry]) -> Vec<MemoryPattern> {
    use std::collections::HashMap;

    let mut counts: HashMap<String, (u32, Vec<String>)> = HashMap::new();

    for entry in entries {
        let mut seen = std::collections::HashSet::new();

        for tag in &entry.tags {
            seen.insert(tag.to_lowercase());
        }
        for word in entry.summary.split_whitespace() {
            let word: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if word.len() >= PATTERN_MIN_WORD_LEN {
                seen.insert(word);
            }
        }

        for theme in seen {
            let slot = counts.entry(theme).or_insert_with(|| (0, Vec::new()));
            slot.0 += 1;
            if slot.1.len() < 3 {
                slot.1.push(entry.input.clone());
            }
        }
    }

    let mut patterns: Vec<MemoryPattern> = counts
        .into_iter()
        .filter(|(_, (freq, _))| *freq >= PATTERN_MIN_FREQUENCY)
        .map(|(theme, (frequency, examples))| MemoryPattern {
            theme,
            frequency,
            examples,
        })
        .collect();

    patterns.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.theme.cmp(&b.theme)));
    patterns.truncate(PATTERN_CAP);
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::store::SqliteStore;
    use std::time::Duration;

    fn service() -> MemoryService {
        MemoryService::from_backends(
            Arc::new(SqliteStore::open_in_memory().unwrap()),
            Arc::new(MockBackend::new()),
        )
    }

    #[test]
    fn test_remember_then_recall_round_trip() {
        let service = service();

        service.remember(
            "tutor",
            Some("user-1"),
            "I want to learn Rust ownership",
            "user is learning rust ownership",
            None,
            MemoryKind::Summary,
            vec!["rust".to_string()],
        );

        let options = RecallOptions::new().with_topic("rust ownership");
        let context = service.recall("tutor", Some("user-1"), &options);

        assert_eq!(context.entries.len(), 1);
        assert!(!context.cache_hit);
        assert_eq!(context.entries[0].input, "I want to learn Rust ownership");
        assert_eq!(context.entries[0].tags, vec!["rust".to_string()]);
        assert!(context.average_relevance > 0.0);
    }

    #[test]
    fn test_recall_cache_hit_within_ttl() {
        let service = service();
        service.remember(
            "tutor",
            Some("user-1"),
            "input",
            "summary",
            None,
            MemoryKind::Summary,
            Vec::new(),
        );

        let options = RecallOptions::new().with_topic("summary");
        let miss = service.recall("tutor", Some("user-1"), &options);
        let hit = service.recall("tutor", Some("user-1"), &options);

        assert!(!miss.cache_hit);
        assert!(hit.cache_hit);
        assert_eq!(hit.total_matches, miss.total_matches);
        assert_eq!(
            hit.entries.iter().map(|e| e.id).collect::<Vec<_>>(),
            miss.entries.iter().map(|e| e.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_recall_kind_filter_gets_its_own_cache_slot() {
        let service = service();
        service.remember(
            "tutor",
            Some("user-1"),
            "I want to learn Rust",
            "learn rust",
            None,
            MemoryKind::Goal,
            Vec::new(),
        );
        service.remember(
            "tutor",
            Some("user-1"),
            "covered ownership today",
            "ownership basics done",
            None,
            MemoryKind::Summary,
            Vec::new(),
        );

        let broad = service.recall("tutor", Some("user-1"), &RecallOptions::new());
        assert_eq!(broad.entries.len(), 2);

        let goals_only = service.recall(
            "tutor",
            Some("user-1"),
            &RecallOptions::new().with_kinds(vec![MemoryKind::Goal]),
        );
        assert!(!goals_only.cache_hit);
        assert_eq!(goals_only.entries.len(), 1);
        assert!(goals_only.entries.iter().all(|e| e.kind == MemoryKind::Goal));
    }

    #[test]
    fn test_recall_cache_expiry_recomputes() {
        let store = FallbackStore::new(
            Arc::new(SqliteStore::open_in_memory().unwrap()),
            Arc::new(MockBackend::new()),
        );
        let service =
            MemoryService::with_cache(store, RecallCache::new(Duration::from_millis(20), 20));

        service.remember(
            "tutor",
            None,
            "input",
            "summary",
            None,
            MemoryKind::Summary,
            Vec::new(),
        );

        let options = RecallOptions::new();
        let _ = service.recall("tutor", None, &options);
        std::thread::sleep(Duration::from_millis(50));
        let recomputed = service.recall("tutor", None, &options);
        assert!(!recomputed.cache_hit);
    }

    #[test]
    fn test_recall_degrades_to_empty_on_storage_failure() {
        let service = MemoryService::from_backends(
            Arc::new(MockBackend::failing()),
            Arc::new(MockBackend::failing()),
        );

        let context = service.recall("tutor", Some("user-1"), &RecallOptions::new());
        assert!(context.is_empty());
        assert_eq!(context.total_matches, 0);
    }

    #[test]
    fn test_recall_touches_returned_entries() {
        let service = service();
        let entry = service.remember(
            "tutor",
            None,
            "input",
            "summary",
            None,
            MemoryKind::Goal,
            Vec::new(),
        );

        let _ = service.recall("tutor", None, &RecallOptions::new());

        // Second recall (cache miss via different topic) sees the bump
        let context = service.recall(
            "tutor",
            None,
            &RecallOptions::new().with_topic("summary"),
        );
        let recalled = context.entries.iter().find(|e| e.id == entry.id).unwrap();
        assert!(recalled.frequency >= 2);
    }

    #[test]
    fn test_pattern_extraction_requires_recurrence() {
        let a = MemoryEntry::new("t", MemoryKind::Summary, "first rust question", "learning rust ownership");
        let b = MemoryEntry::new("t", MemoryKind::Summary, "second rust question", "more rust ownership practice");
        let c = MemoryEntry::new("t", MemoryKind::Summary, "unrelated", "gardening tips");

        let patterns = extract_patterns(&[a, b, c]);
        let themes: Vec<&str> = patterns.iter().map(|p| p.theme.as_str()).collect();
        assert!(themes.contains(&"ownership"));
        assert!(!themes.contains(&"gardening"));

        let ownership = patterns.iter().find(|p| p.theme == "ownership").unwrap();
        assert_eq!(ownership.frequency, 2);
        assert_eq!(ownership.examples.len(), 2);
    }

    #[test]
    fn test_recall_limit_and_total_matches() {
        let service = service();
        for i in 0..15 {
            service.remember(
                "tutor",
                None,
                &format!("input {}", i),
                &format!("summary {}", i),
                None,
                MemoryKind::Summary,
                Vec::new(),
            );
        }

        let options = RecallOptions::new().with_limit(5);
        let context = service.recall("tutor", None, &options);
        assert_eq!(context.entries.len(), 5);
        assert_eq!(context.total_matches, 15);
    }
}
