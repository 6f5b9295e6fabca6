//! Client-side relevance ranking.
//!
//! [`rank`] computes a composite score per entry from topical match, recency,
//! and kind weighting, then orders the survivors. It takes the clock value as
//! an explicit argument so the whole computation is a pure function of its
//! inputs.

use chrono::{DateTime, Utc};

use parley_types::{MemoryEntry, MemoryKind};

use crate::query::TimeWindow;

/// Relevance assumed for entries with no stored query-time score.
pub const BASE_RELEVANCE: f32 = 0.5;

/// Recency boost decays linearly to zero over this many days.
pub const RECENCY_WINDOW_DAYS: f32 = 30.0;

/// Maximum recency boost.
pub const RECENCY_BOOST_CAP: f32 = 0.1;

/// Flat bonus for goal entries.
pub const GOAL_BONUS: f32 = 0.2;

/// Fuzzy topic words shorter than this are ignored.
const MIN_TOPIC_WORD_LEN: usize = 3;

/// How topic relevance is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchingMode {
    /// Topic relevance is 1.0 iff the topic appears verbatim as a substring.
    Strict,
    /// Topic relevance is the fraction of topic words found in the entry.
    #[default]
    Fuzzy,
}

impl MatchingMode {
    /// Stable string form, used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Fuzzy => "fuzzy",
        }
    }
}

/// Options controlling a ranking pass.
#[derive(Debug, Clone, Default)]
pub struct RankOptions {
    /// Topic to score entries against.
    pub topic: Option<String>,
    pub matching: MatchingMode,
    /// Entries scoring below this are dropped.
    pub min_confidence: f32,
    /// Entries carrying none of these tags are dropped (empty = no filter).
    pub tag_filter: Vec<String>,
    /// Entries created outside this window are dropped.
    pub time_window: TimeWindow,
}

impl RankOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
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
}

/// Rank entries by composite relevance, dropping filtered ones.
///
/// Scores are written back to each entry's `relevance_score`. Results are
/// sorted descending by score, ties broken by more recent `created_at`.
pub fn rank(
    entries: Vec<MemoryEntry>,
    options: &RankOptions,
    now: DateTime<Utc>,
) -> Vec<MemoryEntry> {
    let cutoff = options.time_window.cutoff_from(now);
    let topic = options
        .topic
        .as_deref()
        .map(str::to_lowercase)
        .filter(|t| !t.trim().is_empty());

    let mut ranked: Vec<MemoryEntry> = entries
        .into_iter()
        .filter(|e| cutoff.is_none_or(|c| e.created_at >= c))
        .filter(|e| passes_tag_filter(e, &options.tag_filter))
        .filter_map(|mut entry| {
            let score = score_entry(&entry, topic.as_deref(), options.matching, now);
            if score < options.min_confidence {
                return None;
            }
            entry.relevance_score = Some(score);
            Some(entry)
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    ranked
}

fn passes_tag_filter(entry: &MemoryEntry, filter: &[String]) -> bool {
    filter.is_empty() || filter.iter().any(|t| entry.tags.contains(t))
}

fn score_entry(
    entry: &MemoryEntry,
    topic: Option<&str>,
    matching: MatchingMode,
    now: DateTime<Utc>,
) -> f32 {
    let mut score = entry.relevance_score.unwrap_or(BASE_RELEVANCE);

    if let Some(topic) = topic {
        let relevance = topic_relevance(entry, topic, matching);
        score = (score + relevance) / 2.0;
    }

    score += recency_boost(entry.created_at, now);

    if entry.kind == MemoryKind::Goal {
        score += GOAL_BONUS;
    }

    score
}

/// Linear recency boost: full cap for brand-new entries, zero past the window.
fn recency_boost(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
    let age_days = (now - created_at).num_seconds() as f32 / 86_400.0;
    if age_days < 0.0 {
        return RECENCY_BOOST_CAP;
    }
    let remaining = 1.0 - (age_days / RECENCY_WINDOW_DAYS);
    (RECENCY_BOOST_CAP * remaining).clamp(0.0, RECENCY_BOOST_CAP)
}

fn topic_relevance(entry: &MemoryEntry, topic: &str, matching: MatchingMode) -> f32 {
    let text = entry.searchable_text().to_lowercase();

    match matching {
        MatchingMode::Strict => {
            if text.contains(topic) {
                1.0
            } else {
                0.0
            }
        }
        MatchingMode::Fuzzy => {
            let words: Vec<&str> = topic
                .split_whitespace()
                .filter(|w| w.len() >= MIN_TOPIC_WORD_LEN)
                .collect();
            if words.is_empty() {
                return 0.0;
            }
            let found = words.iter().filter(|w| text.contains(*w)).count();
            found as f32 / words.len() as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use parley_types::MemoryKind;

    fn entry(kind: MemoryKind, input: &str, summary: &str) -> MemoryEntry {
        MemoryEntry::new("tutor", kind, input, summary)
    }

    #[test]
    fn test_rank_is_deterministic_for_fixed_clock() {
        let now = Utc::now();
        let entries = vec![
            entry(MemoryKind::Summary, "rust ownership", "borrow checker"),
            entry(MemoryKind::Goal, "learn rust", "learn rust basics"),
        ];

        let options = RankOptions::new().with_topic("rust");
        let a = rank(entries.clone(), &options, now);
        let b = rank(entries, &options, now);

        let scores_a: Vec<_> = a.iter().map(|e| e.relevance_score).collect();
        let scores_b: Vec<_> = b.iter().map(|e| e.relevance_score).collect();
        assert_eq!(scores_a, scores_b);
    }

    #[test]
    fn test_goal_entries_get_bonus() {
        let now = Utc::now();
        let goal = entry(MemoryKind::Goal, "same text", "same text");
        let log = entry(MemoryKind::Log, "same text", "same text");

        let ranked = rank(vec![log, goal], &RankOptions::new(), now);
        assert_eq!(ranked[0].kind, MemoryKind::Goal);
        let diff = ranked[0].relevance_score.unwrap() - ranked[1].relevance_score.unwrap();
        assert!((diff - GOAL_BONUS).abs() < 0.01);
    }

    #[test]
    fn test_strict_topic_requires_verbatim_substring() {
        let now = Utc::now();
        let hit = entry(MemoryKind::Summary, "I love rust programming", "notes");
        let miss = entry(MemoryKind::Summary, "I love programming", "notes");

        let options = RankOptions::new()
            .with_topic("rust programming")
            .with_matching(MatchingMode::Strict);
        let ranked = rank(vec![miss.clone(), hit.clone()], &options, now);

        let hit_score = ranked.iter().find(|e| e.id == hit.id).unwrap();
        let miss_score = ranked.iter().find(|e| e.id == miss.id).unwrap();
        assert!(hit_score.relevance_score.unwrap() > miss_score.relevance_score.unwrap());
    }

    #[test]
    fn test_fuzzy_topic_scores_word_fraction() {
        let now = Utc::now();
        // "learn" and "rust" pass the length filter; "to" does not
        let e = entry(MemoryKind::Summary, "I want to learn things", "no mention of the language");
        let options = RankOptions::new().with_topic("learn rust");
        let ranked = rank(vec![e], &options, now);

        // topic relevance 0.5 → score = (0.5 + 0.5)/2 + recency
        let score = ranked[0].relevance_score.unwrap();
        assert!((score - (0.5 + RECENCY_BOOST_CAP)).abs() < 0.01);
    }

    #[test]
    fn test_recency_boost_decays_and_caps() {
        let now = Utc::now();
        assert!((recency_boost(now, now) - RECENCY_BOOST_CAP).abs() < 1e-4);

        let half = recency_boost(now - Duration::days(15), now);
        assert!((half - RECENCY_BOOST_CAP / 2.0).abs() < 0.01);

        assert_eq!(recency_boost(now - Duration::days(60), now), 0.0);
    }

    #[test]
    fn test_min_confidence_drops_entries() {
        let now = Utc::now();
        let e = entry(MemoryKind::Log, "old entry", "old entry");
        let mut aged = e.clone();
        aged.created_at = now - Duration::days(90);

        // Aged log entry: base 0.5, no boosts → 0.5
        let options = RankOptions::new().with_min_confidence(0.9);
        assert!(rank(vec![aged], &options, now).is_empty());
    }

    #[test]
    fn test_tag_filter_drops_unmatched_entries() {
        let now = Utc::now();
        let tagged = entry(MemoryKind::Summary, "a", "b").with_tag("rust");
        let untagged = entry(MemoryKind::Summary, "c", "d");

        let options = RankOptions::new().with_tag_filter(vec!["rust".to_string()]);
        let ranked = rank(vec![tagged.clone(), untagged], &options, now);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, tagged.id);
    }

    #[test]
    fn test_ties_break_by_newer_created_at() {
        let now = Utc::now();
        let mut older = entry(MemoryKind::Log, "same", "same");
        older.created_at = now - Duration::days(60);
        let mut old = entry(MemoryKind::Log, "same", "same");
        old.created_at = now - Duration::days(45);

        // Both past the recency window → identical scores
        let ranked = rank(vec![older.clone(), old.clone()], &RankOptions::new(), now);
        assert_eq!(ranked[0].id, old.id);
        assert_eq!(ranked[1].id, older.id);
    }

    #[test]
    fn test_time_window_filter() {
        let now = Utc::now();
        let mut stale = entry(MemoryKind::Log, "stale", "stale");
        stale.created_at = now - Duration::days(10);
        let fresh = entry(MemoryKind::Log, "fresh", "fresh");

        let options = RankOptions::new().with_time_window(TimeWindow::Week);
        let ranked = rank(vec![stale, fresh.clone()], &options, now);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, fresh.id);
    }
}
