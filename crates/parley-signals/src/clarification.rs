//! Clarification detector.
//!
//! Scores how ambiguous the current utterance is across four categories and
//! a handful of structural heuristics, then decides whether the agent should
//! ask for clarification before answering.

use parley_types::{ClarificationCategory, ClarificationResult};

use crate::error::Result;
use crate::rules::{RuleSet, words};

/// Cumulative score at which clarification is needed.
pub const CLARIFICATION_THRESHOLD: f32 = 0.8;

/// Boost for a very short utterance that sits on the stoplist.
pub const SHORT_INPUT_BOOST: f32 = 0.8;

/// Boost for a generic-request phrase.
pub const GENERIC_REQUEST_BOOST: f32 = 0.6;

/// Boost for a pronoun with no antecedent noun nearby.
pub const UNRESOLVED_PRONOUN_BOOST: f32 = 0.4;

/// Boost applied once each for a missing action verb / concrete noun.
pub const MISSING_STRUCTURE_BOOST: f32 = 0.3;

/// Damping factor when the previous turn already asked for clarification.
pub const ANSWER_DAMPING: f32 = 0.7;

/// Utterances at or under this length are candidates for the short-input boost.
const SHORT_INPUT_MAX_LEN: usize = 15;

const PATTERN_CONTRIBUTION: f32 = 0.5;
const KEYWORD_CONTRIBUTION: f32 = 0.3;

/// Bare verbs/objects that say nothing on their own.
const SHORT_INPUT_STOPLIST: &[&str] = &[
    "help", "fix", "improve", "change", "update", "make", "do", "better", "faster", "this",
    "that", "it", "something", "stuff",
];

/// Phrases that request assistance without saying with what.
const GENERIC_REQUESTS: &[&str] = &[
    "help me",
    "can you help",
    "i need help",
    "do something",
    "make it work",
    "fix this",
    "sort this out",
];

/// Greetings and confirmations that never need clarification.
const BASIC_EXCHANGES: &[&str] = &[
    "hi", "hello", "hey", "good morning", "good afternoon", "good evening", "yes", "no", "ok",
    "okay", "sure", "thanks", "thank you", "bye", "goodbye",
];

/// Pronouns that need an antecedent to resolve.
const PRONOUNS: &[&str] = &["it", "this", "that", "them", "those", "these"];

/// Verbs that give an utterance an actionable shape.
const ACTION_VERBS: &[&str] = &[
    "learn", "build", "create", "make", "write", "fix", "debug", "explain", "compare",
    "analyze", "optimize", "plan", "design", "research", "summarize", "improve", "teach",
    "show", "find", "automate", "explore", "review", "help", "understand", "start",
];

/// Function words that cannot serve as a concrete subject.
const FUNCTION_WORDS: &[&str] = &[
    "i", "you", "we", "they", "he", "she", "a", "an", "the", "to", "of", "in", "on", "at",
    "for", "with", "and", "or", "but", "so", "is", "are", "was", "were", "be", "been", "can",
    "could", "should", "would", "will", "do", "does", "did", "my", "your", "our", "me", "us",
    "how", "what", "when", "where", "why", "please", "want", "need", "like", "it", "this",
    "that", "them", "those", "these", "some", "any", "thing", "things", "something", "stuff",
];

/// Detector with compiled rule tables.
#[derive(Debug)]
pub struct ClarificationDetector {
    categories: Vec<(ClarificationCategory, RuleSet)>,
}

impl ClarificationDetector {
    /// Compile the rule tables.
    pub fn new() -> Result<Self> {
        let categories = vec![
            (
                ClarificationCategory::VagueInput,
                RuleSet::compile(
                    "vague_input",
                    1.2,
                    &[
                        r"(?i)^(help|help me|i need help)\b",
                        r"(?i)\bdo (something|stuff|anything)\b",
                        r"(?i)^(can|could) you help\b",
                    ],
                    &["help", "something", "stuff", "whatever", "anything"],
                )?,
            ),
            (
                ClarificationCategory::MissingSubject,
                RuleSet::compile(
                    "missing_subject",
                    1.1,
                    &[
                        r"(?i)^(fix|improve|change|update|optimize) (it|this|that)\b",
                        r"(?i)\bmake (it|this|that) (better|work|faster)\b",
                    ],
                    &[],
                )?,
            ),
            (
                ClarificationCategory::UnderspecifiedGoal,
                RuleSet::compile(
                    "underspecified_goal",
                    1.0,
                    &[
                        r"(?i)\bi want to\s*$",
                        r"(?i)\b(get|be) better\s*$",
                        r"(?i)\bwhere (do|should) i (start|begin)\b",
                    ],
                    &["somehow", "eventually"],
                )?,
            ),
            (
                ClarificationCategory::AmbiguousContext,
                RuleSet::compile(
                    "ambiguous_context",
                    1.0,
                    &[
                        r"(?i)\blike (before|last time)\b",
                        r"(?i)\bthe (usual|same) (thing|way|one)\b",
                        r"(?i)\byou know what i mean\b",
                    ],
                    &["usual"],
                )?,
            ),
        ];

        Ok(Self { categories })
    }

    /// Decide whether the utterance needs clarification.
    ///
    /// `answering_clarification` should be true when the previous turn asked
    /// the user a clarifying question: the current input is then probably an
    /// answer, so the score is damped rather than treated as fresh ambiguity.
    pub fn detect(&self, utterance: &str, answering_clarification: bool) -> ClarificationResult {
        let trimmed = utterance.trim();
        let normalized = trimmed.trim_end_matches(['.', '!', '?']).to_lowercase();

        // Greetings and confirmations never need clarification.
        if BASIC_EXCHANGES.contains(&normalized.as_str()) {
            return ClarificationResult::none();
        }

        let mut score = 0.0;
        let mut fired = Vec::new();

        for (category, set) in &self.categories {
            let contribution = set.score(trimmed, PATTERN_CONTRIBUTION, KEYWORD_CONTRIBUTION);
            if contribution > 0.0 {
                score += contribution;
                fired.push(*category);
            }
        }

        score += self.heuristic_boosts(trimmed, &mut fired);

        if answering_clarification {
            score *= ANSWER_DAMPING;
        }

        ClarificationResult {
            needed: score >= CLARIFICATION_THRESHOLD,
            score,
            categories: fired,
        }
    }

    fn heuristic_boosts(&self, utterance: &str, fired: &mut Vec<ClarificationCategory>) -> f32 {
        let mut boost = 0.0;
        let tokens = words(utterance);
        let lowercase = utterance.to_lowercase();

        if utterance.len() <= SHORT_INPUT_MAX_LEN
            && tokens.iter().any(|w| SHORT_INPUT_STOPLIST.contains(&w.as_str()))
        {
            boost += SHORT_INPUT_BOOST;
            push_unique(fired, ClarificationCategory::VagueInput);
        }

        if GENERIC_REQUESTS.iter().any(|g| lowercase.contains(g)) {
            boost += GENERIC_REQUEST_BOOST;
            push_unique(fired, ClarificationCategory::VagueInput);
        }

        if has_unresolved_pronoun(&tokens) {
            boost += UNRESOLVED_PRONOUN_BOOST;
            push_unique(fired, ClarificationCategory::MissingSubject);
        }

        let has_verb = tokens.iter().any(|w| ACTION_VERBS.contains(&w.as_str()));
        let has_noun = tokens
            .iter()
            .any(|w| !FUNCTION_WORDS.contains(&w.as_str()) && !ACTION_VERBS.contains(&w.as_str()));
        if !has_verb {
            boost += MISSING_STRUCTURE_BOOST;
            push_unique(fired, ClarificationCategory::UnderspecifiedGoal);
        }
        if !has_noun {
            boost += MISSING_STRUCTURE_BOOST;
            push_unique(fired, ClarificationCategory::MissingSubject);
        }

        boost
    }
}

/// A pronoun is unresolved when none of the 3 words before it could be a
/// noun antecedent.
fn has_unresolved_pronoun(tokens: &[String]) -> bool {
    for (i, token) in tokens.iter().enumerate() {
        if !PRONOUNS.contains(&token.as_str()) {
            continue;
        }
        let window_start = i.saturating_sub(3);
        let has_antecedent = tokens[window_start..i].iter().any(|w| {
            !FUNCTION_WORDS.contains(&w.as_str()) && !ACTION_VERBS.contains(&w.as_str())
        });
        if !has_antecedent {
            return true;
        }
    }
    false
}

fn push_unique(fired: &mut Vec<ClarificationCategory>, category: ClarificationCategory) {
    if !fired.contains(&category) {
        fired.push(category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> ClarificationDetector {
        ClarificationDetector::new().unwrap()
    }

    #[test]
    fn test_greeting_short_circuits() {
        let result = detector().detect("hi", false);
        assert!(!result.needed);
        assert_eq!(result.score, 0.0);

        assert!(!detector().detect("thanks!", false).needed);
        assert!(!detector().detect("ok", false).needed);
    }

    #[test]
    fn test_bare_help_needs_clarification() {
        let result = detector().detect("help", false);
        assert!(result.needed, "score was {}", result.score);
        assert!(result.categories.contains(&ClarificationCategory::VagueInput));
    }

    #[test]
    fn test_missing_subject_pronoun() {
        let result = detector().detect("fix it", false);
        assert!(result.needed);
        assert!(result.categories.contains(&ClarificationCategory::MissingSubject));
    }

    #[test]
    fn test_concrete_request_passes() {
        let result = detector().detect(
            "explain how Rust lifetimes interact with generic type parameters",
            false,
        );
        assert!(!result.needed, "score was {}", result.score);
    }

    #[test]
    fn test_generic_request_boost() {
        let result = detector().detect("can you help me with something", false);
        assert!(result.needed);
        assert!(result.score >= CLARIFICATION_THRESHOLD);
    }

    #[test]
    fn test_answer_damping_after_clarification() {
        let detector = detector();
        let fresh = detector.detect("the second one", false);
        let answering = detector.detect("the second one", true);

        assert!(answering.score < fresh.score);
        assert!((answering.score - fresh.score * ANSWER_DAMPING).abs() < 1e-4);
    }

    #[test]
    fn test_resolved_pronoun_is_not_boosted() {
        // "project" sits within 3 words before "it"
        let tokens = words("my project needs it reviewed");
        assert!(!has_unresolved_pronoun(&tokens));

        let tokens = words("can you fix it");
        assert!(has_unresolved_pronoun(&tokens));
    }

    #[test]
    fn test_threshold_boundary() {
        // Score just under the threshold must not fire.
        let result = detector().detect("improve my landing page conversion copy", false);
        assert!(result.score < CLARIFICATION_THRESHOLD, "score was {}", result.score);
        assert!(!result.needed);
    }
}
