//! Intent detection.
//!
//! Ordered rule checks: continuation phrasing, vague input, persona rules,
//! the shared keyword ladder, then the persona default.

use parley_signals::rules::word_set;
use parley_types::Intent;

use crate::agents::AgentProfile;

/// Minimum utterance length before it can carry an intent at all.
const MIN_ACTIONABLE_LEN: usize = 3;

/// Phrases that continue the previous turn.
const CONTINUATION_PHRASES: &[&str] = &[
    "continue",
    "keep going",
    "go on",
    "carry on",
    "next",
    "what's next",
    "whats next",
    "more of that",
    "as before",
];

/// Shared keyword ladder, checked in priority order after persona rules.
const INTENT_LADDER: &[(Intent, &[&str])] = &[
    (Intent::Learn, &["learn", "teach", "study", "understand", "tutorial"]),
    (Intent::Compare, &["compare", "versus", "vs", "difference", "differences"]),
    (Intent::Explain, &["explain", "meaning", "definition", "clarify"]),
    (Intent::Explore, &["explore", "discover", "browse"]),
    (Intent::Research, &["research", "investigate", "sources"]),
    (Intent::Analyze, &["analyze", "analyse", "evaluate", "assess", "review"]),
    (Intent::Create, &["create", "build", "make", "write", "generate", "draft"]),
    (Intent::Optimize, &["optimize", "improve", "faster", "speed", "performance"]),
    (Intent::Automate, &["automate", "automation", "script", "workflow"]),
    (Intent::Plan, &["plan", "roadmap", "schedule", "strategy", "steps"]),
    (Intent::Summarize, &["summarize", "summary", "recap", "tldr"]),
    (Intent::Debug, &["debug", "fix", "error", "bug", "broken", "crash"]),
];

/// Whether the utterance reads as continuation phrasing.
pub fn is_continuation_phrase(utterance: &str) -> bool {
    let normalized = utterance
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .to_lowercase();
    CONTINUATION_PHRASES.contains(&normalized.as_str())
}

/// Detect the intent of a cleaned utterance.
///
/// `can_continue` is true when a prior turn exists (session state or a
/// routing flag), gating the continuation check. `too_vague` comes from the
/// clarification detector.
pub fn detect_intent(
    utterance: &str,
    profile: &AgentProfile,
    can_continue: bool,
    too_vague: bool,
) -> Intent {
    if can_continue && is_continuation_phrase(utterance) {
        return Intent::Continue;
    }

    if too_vague || utterance.trim().len() < MIN_ACTIONABLE_LEN {
        return Intent::Clarify;
    }

    let words = word_set(utterance);

    for rule in profile.rules {
        if rule.keywords.iter().any(|k| words.contains(*k)) {
            return rule.intent;
        }
    }

    for (intent, keywords) in INTENT_LADDER {
        if keywords.iter().any(|k| words.contains(*k)) {
            return *intent;
        }
    }

    profile.default_intent
}

/// Count ladder keywords for an intent present in the utterance.
///
/// Feeds the planner's confidence computation.
pub fn keyword_matches(utterance: &str, intent: Intent) -> usize {
    let words = word_set(utterance);
    INTENT_LADDER
        .iter()
        .find(|(i, _)| *i == intent)
        .map(|(_, keywords)| keywords.iter().filter(|k| words.contains(**k)).count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentRegistry;

    #[test]
    fn test_continuation_requires_prior_turn() {
        let profile = AgentRegistry.profile("tutor");
        assert_eq!(detect_intent("continue", profile, true, false), Intent::Continue);
        assert_ne!(detect_intent("continue", profile, false, false), Intent::Continue);
    }

    #[test]
    fn test_vague_input_clarifies() {
        let profile = AgentRegistry.profile("tutor");
        assert_eq!(detect_intent("help", profile, false, true), Intent::Clarify);
        assert_eq!(detect_intent("hm", profile, false, false), Intent::Clarify);
    }

    #[test]
    fn test_persona_rules_run_before_ladder() {
        // "evidence" is a researcher rule for Research; ladder alone would
        // not pick it up.
        let profile = AgentRegistry.profile("researcher");
        assert_eq!(
            detect_intent("what evidence supports this claim", profile, false, false),
            Intent::Research
        );
    }

    #[test]
    fn test_ladder_priority_order() {
        let profile = AgentRegistry.profile("strategist");
        // "learn" outranks "plan" in the ladder.
        assert_eq!(
            detect_intent("i want to learn how to plan sprints", profile, false, false),
            Intent::Learn
        );
    }

    #[test]
    fn test_default_intent_when_nothing_matches() {
        let profile = AgentRegistry.profile("strategist");
        assert_eq!(
            detect_intent("tell me about the weather", profile, false, false),
            Intent::Plan
        );
    }

    #[test]
    fn test_keyword_match_count() {
        assert_eq!(keyword_matches("i want to learn from a tutorial", Intent::Learn), 2);
        assert_eq!(keyword_matches("hello there", Intent::Learn), 0);
    }
}
