//! Reasoning-level detection.
//!
//! Resolution order: explicit depth phrasing in the utterance, a level
//! previously recorded in memory, the domain complexity table, structural
//! heuristics, then the intermediate default.

use regex::Regex;

use parley_signals::rules::word_set;
use parley_types::{MemoryEntry, ReasoningLevel};

use crate::domain::DomainRegistry;
use crate::error::Result;

/// Memory tag prefix under which a preferred level is recorded.
pub const LEVEL_TAG_PREFIX: &str = "level:";

/// Questions at or under this length lean basic.
const SHORT_QUESTION_MAX_LEN: usize = 25;

/// Vocabulary that marks a technically fluent utterance.
const TECHNICAL_TERMS: &[&str] = &[
    "algorithm", "architecture", "asynchronous", "complexity", "concurrency", "latency",
    "throughput", "idempotent", "heuristic", "regression", "normalization", "amortized",
    "invariant", "serialization",
];

/// Compiled depth-phrasing rules.
#[derive(Debug)]
pub struct ReasoningRules {
    simple: Vec<Regex>,
    deep: Vec<Regex>,
}

impl ReasoningRules {
    pub fn new() -> Result<Self> {
        let simple = [
            r"(?i)\bexplain (it )?(simply|simple|like i'?m)\b",
            r"(?i)\bin (simple|plain) (terms|words|english)\b",
            r"(?i)\bkeep it (simple|short|brief)\b",
            r"(?i)\beli5\b",
            r"(?i)\bfor (a )?beginner'?s?\b",
        ]
        .iter()
        .map(|p| Regex::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

        let deep = [
            r"(?i)\bgo (deep|deeper)\b",
            r"(?i)\bin depth\b",
            r"(?i)\b(detailed|thorough|comprehensive) (explanation|answer|breakdown)\b",
            r"(?i)\ball the details\b",
            r"(?i)\b(advanced|expert) level\b",
        ]
        .iter()
        .map(|p| Regex::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { simple, deep })
    }

    /// Level explicitly requested by the utterance, if any.
    fn explicit_level(&self, utterance: &str) -> Option<ReasoningLevel> {
        if self.simple.iter().any(|p| p.is_match(utterance)) {
            return Some(ReasoningLevel::Basic);
        }
        if self.deep.iter().any(|p| p.is_match(utterance)) {
            return Some(ReasoningLevel::Advanced);
        }
        None
    }

    /// Resolve the reasoning level for a cleaned utterance.
    pub fn detect(
        &self,
        utterance: &str,
        memories: &[MemoryEntry],
        domain: &str,
        domains: &DomainRegistry,
    ) -> ReasoningLevel {
        if let Some(level) = self.explicit_level(utterance) {
            return level;
        }

        if let Some(level) = remembered_level(memories) {
            return level;
        }

        if let Some(level) = domains.complexity(domain) {
            return level;
        }

        let words = word_set(utterance);
        if TECHNICAL_TERMS.iter().any(|t| words.contains(*t)) {
            return ReasoningLevel::Advanced;
        }
        if utterance.trim().ends_with('?') && utterance.trim().len() <= SHORT_QUESTION_MAX_LEN {
            return ReasoningLevel::Basic;
        }

        ReasoningLevel::Intermediate
    }
}

/// Most recently recorded `level:` tag across the recalled memories.
fn remembered_level(memories: &[MemoryEntry]) -> Option<ReasoningLevel> {
    let mut tagged: Vec<&MemoryEntry> = memories
        .iter()
        .filter(|m| m.tags.iter().any(|t| t.starts_with(LEVEL_TAG_PREFIX)))
        .collect();
    tagged.sort_by_key(|m| std::cmp::Reverse(m.created_at));
    tagged.first().and_then(|m| {
        m.tags
            .iter()
            .find_map(|t| t.strip_prefix(LEVEL_TAG_PREFIX).and_then(parse_level))
    })
}

fn parse_level(raw: &str) -> Option<ReasoningLevel> {
    match raw {
        "basic" => Some(ReasoningLevel::Basic),
        "intermediate" => Some(ReasoningLevel::Intermediate),
        "advanced" => Some(ReasoningLevel::Advanced),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::MemoryKind;

    fn rules() -> ReasoningRules {
        ReasoningRules::new().unwrap()
    }

    fn registry() -> DomainRegistry {
        DomainRegistry::default()
    }

    #[test]
    fn test_explicit_phrasing_wins() {
        let level = rules().detect(
            "explain it simply, i have a data science background",
            &[],
            "data",
            &registry(),
        );
        assert_eq!(level, ReasoningLevel::Basic);

        let level = rules().detect("go deep on borrow checking", &[], "general", &registry());
        assert_eq!(level, ReasoningLevel::Advanced);
    }

    #[test]
    fn test_remembered_level() {
        let memory = MemoryEntry::new("tutor", MemoryKind::Correction, "x", "prefers basic")
            .with_tag(format!("{LEVEL_TAG_PREFIX}basic"));
        let level = rules().detect("how do closures work", &[memory], "general", &registry());
        assert_eq!(level, ReasoningLevel::Basic);
    }

    #[test]
    fn test_domain_complexity_table() {
        let level = rules().detect("run a regression on churn", &[], "data", &registry());
        assert_eq!(level, ReasoningLevel::Advanced);
    }

    #[test]
    fn test_short_question_is_basic() {
        let level = rules().detect("what is an enum?", &[], "general", &registry());
        assert_eq!(level, ReasoningLevel::Basic);
    }

    #[test]
    fn test_default_is_intermediate() {
        let level = rules().detect(
            "walk me through setting up a home espresso routine",
            &[],
            "general",
            &registry(),
        );
        assert_eq!(level, ReasoningLevel::Intermediate);
    }
}
