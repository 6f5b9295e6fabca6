//! Data-driven rule tables shared by the signal extractors.
//!
//! Each extractor declares its categories as a list of [`RuleSet`]s: a label,
//! a weight, regex patterns, and keywords. New categories are additive and
//! each set is testable in isolation.

use regex::Regex;

use crate::error::Result;

/// A weighted pattern/keyword rule set for one category.
#[derive(Debug)]
pub struct RuleSet {
    /// Category label (diagnostic only).
    pub label: &'static str,
    /// Per-category weight applied to every contribution.
    pub weight: f32,
    patterns: Vec<Regex>,
    keywords: Vec<&'static str>,
}

impl RuleSet {
    /// Compile a rule set from pattern sources and keywords.
    pub fn compile(
        label: &'static str,
        weight: f32,
        patterns: &[&str],
        keywords: &[&'static str],
    ) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            label,
            weight,
            patterns,
            keywords: keywords.to_vec(),
        })
    }

    /// Number of patterns that match the utterance.
    pub fn pattern_matches(&self, utterance: &str) -> usize {
        self.patterns.iter().filter(|p| p.is_match(utterance)).count()
    }

    /// Number of keywords present as whole words in the utterance.
    pub fn keyword_hits(&self, utterance: &str) -> usize {
        let words = word_set(utterance);
        self.keywords
            .iter()
            .filter(|k| words.contains(**k))
            .count()
    }

    /// Composite score: `per_pattern` per matched regex plus `per_keyword`
    /// per keyword hit, both scaled by the category weight.
    pub fn score(&self, utterance: &str, per_pattern: f32, per_keyword: f32) -> f32 {
        let pattern_score = per_pattern * self.pattern_matches(utterance) as f32;
        let keyword_score = per_keyword * self.keyword_hits(utterance) as f32;
        (pattern_score + keyword_score) * self.weight
    }

    /// Whether anything in this set fires at all.
    pub fn matches(&self, utterance: &str) -> bool {
        self.pattern_matches(utterance) > 0 || self.keyword_hits(utterance) > 0
    }
}

/// Lowercased word set of an utterance, punctuation stripped.
pub fn word_set(utterance: &str) -> std::collections::HashSet<String> {
    utterance
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Lowercased word list of an utterance, punctuation stripped, order kept.
pub fn words(utterance: &str) -> Vec<String> {
    utterance
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> RuleSet {
        RuleSet::compile(
            "confused",
            1.0,
            &[r"(?i)\btoo (complex|complicated)\b", r"(?i)\bconfus(ed|ing)\b"],
            &["simpler", "lost"],
        )
        .unwrap()
    }

    #[test]
    fn test_pattern_matches() {
        let set = set();
        assert_eq!(set.pattern_matches("this is too complex for me"), 1);
        assert_eq!(set.pattern_matches("too complicated and confusing"), 2);
        assert_eq!(set.pattern_matches("perfectly clear"), 0);
    }

    #[test]
    fn test_keyword_hits_are_whole_words() {
        let set = set();
        assert_eq!(set.keyword_hits("please make it simpler."), 1);
        // "simplers" is not the keyword "simpler"
        assert_eq!(set.keyword_hits("the simplers"), 0);
    }

    #[test]
    fn test_score_combines_contributions() {
        let set = set();
        // 1 pattern * 0.5 + 1 keyword * 0.3, weight 1.0
        let score = set.score("too complex, make it simpler", 0.5, 0.3);
        assert!((score - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_score_scales_with_weight() {
        let set = RuleSet::compile("vague", 1.2, &[r"(?i)^help\b"], &[]).unwrap();
        let score = set.score("help me out", 0.5, 0.3);
        assert!((score - 0.6).abs() < 1e-4);
    }
}
