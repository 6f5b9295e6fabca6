//! Feedback analyzer.
//!
//! Classifies the current utterance as feedback about the previous response:
//! positive, confused, retry, expand, or negative. The winning category maps
//! to a reasoning-level adjustment the planner can apply.

use parley_types::{
    FeedbackResult, FeedbackType, MemoryEntry, ReasoningAdjustment, ReasoningLevel, SessionState,
};

use crate::error::Result;
use crate::rules::RuleSet;

/// Contribution per matched regex, before category weight.
pub const PATTERN_CONTRIBUTION: f32 = 0.5;

/// Contribution per keyword hit, before category weight.
pub const KEYWORD_CONTRIBUTION: f32 = 0.3;

/// Analyzer with compiled rule tables.
///
/// Declaration order of the category sets doubles as the tie-break order:
/// positive > confused > retry > expand > negative.
#[derive(Debug)]
pub struct FeedbackAnalyzer {
    categories: Vec<(FeedbackType, RuleSet)>,
    follow_up: RuleSet,
}

impl FeedbackAnalyzer {
    /// Compile the rule tables.
    pub fn new() -> Result<Self> {
        let categories = vec![
            (
                FeedbackType::Positive,
                RuleSet::compile(
                    "positive",
                    1.0,
                    &[
                        r"(?i)\b(thanks|thank you|that help(s|ed))\b",
                        r"(?i)\b(got it|makes sense|perfect|exactly)\b",
                        r"(?i)\b(great|excellent) (answer|explanation)\b",
                    ],
                    &["thanks", "helpful", "great", "perfect", "clear", "awesome"],
                )?,
            ),
            (
                FeedbackType::Confused,
                RuleSet::compile(
                    "confused",
                    1.0,
                    &[
                        r"(?i)\btoo (complex|complicated|technical|advanced)\b",
                        r"(?i)\b(don'?t|didn'?t) (get|understand|follow)\b",
                        r"(?i)\bconfus(ed|ing)\b",
                        r"(?i)\b(explain|put it) (it )?(simpler|more simply|in simple terms)\b",
                        r"(?i)\bwhat do you mean\b",
                    ],
                    &["confused", "confusing", "complex", "complicated", "simpler", "lost"],
                )?,
            ),
            (
                FeedbackType::Retry,
                RuleSet::compile(
                    "retry",
                    1.0,
                    &[
                        r"(?i)\btry (that )?again\b",
                        r"(?i)\bnot what i (asked|meant|wanted)\b",
                        r"(?i)\bthat'?s (wrong|not right|incorrect)\b",
                        r"(?i)\b(rephrase|redo|different (way|approach|angle))\b",
                    ],
                    &["again", "wrong", "incorrect", "retry"],
                )?,
            ),
            (
                FeedbackType::Expand,
                RuleSet::compile(
                    "expand",
                    1.0,
                    &[
                        r"(?i)\btell me more\b",
                        r"(?i)\b(go|dig) deeper\b",
                        r"(?i)\bmore detail(s|ed)?\b",
                        r"(?i)\b(elaborate|expand) on\b",
                    ],
                    &["more", "deeper", "detail", "elaborate", "further"],
                )?,
            ),
            (
                FeedbackType::Negative,
                RuleSet::compile(
                    "negative",
                    1.0,
                    &[
                        r"(?i)\b(not|isn'?t) helpful\b",
                        r"(?i)\b(doesn'?t|didn'?t) help\b",
                        r"(?i)\b(useless|terrible|awful)\b",
                    ],
                    &["unhelpful", "useless", "bad", "disappointing"],
                )?,
            ),
        ];

        let follow_up = RuleSet::compile(
            "follow_up",
            1.0,
            &[
                r"(?i)^(and|also|but|then)\b",
                r"(?i)^(what|how) about\b",
                r"(?i)\bone more (thing|question)\b",
            ],
            &["also", "another"],
        )?;

        Ok(Self {
            categories,
            follow_up,
        })
    }

    /// Analyze the utterance as feedback about the prior turn.
    ///
    /// Without a prior turn there is nothing to give feedback on, so the
    /// result is neutral. `_memory` keeps the extractor contract uniform;
    /// feedback needs only the immediately preceding turn.
    pub fn analyze(
        &self,
        utterance: &str,
        prior: Option<&SessionState>,
        _memory: &[MemoryEntry],
    ) -> FeedbackResult {
        if prior.is_none() {
            return FeedbackResult::none();
        }

        let mut winner: Option<(FeedbackType, f32)> = None;
        for (feedback_type, set) in &self.categories {
            let score = set.score(utterance, PATTERN_CONTRIBUTION, KEYWORD_CONTRIBUTION);
            if score <= 0.0 {
                continue;
            }
            // Strictly-greater keeps earlier declarations winning ties.
            match winner {
                Some((_, best)) if score <= best => {}
                _ => winner = Some((*feedback_type, score)),
            }
        }

        let follow_up_detected = self.follow_up.matches(utterance);

        match winner {
            Some((feedback_type, score)) => FeedbackResult {
                feedback_type: Some(feedback_type),
                score,
                follow_up_detected,
                reasoning_adjustment: adjustment_for(feedback_type),
            },
            None => FeedbackResult {
                feedback_type: None,
                score: 0.0,
                follow_up_detected,
                reasoning_adjustment: None,
            },
        }
    }
}

/// Map a feedback category to its implied reasoning adjustment.
fn adjustment_for(feedback_type: FeedbackType) -> Option<ReasoningAdjustment> {
    match feedback_type {
        FeedbackType::Confused => Some(ReasoningAdjustment::Simplify),
        FeedbackType::Expand => Some(ReasoningAdjustment::Expand),
        FeedbackType::Retry | FeedbackType::Negative => Some(ReasoningAdjustment::Retry),
        FeedbackType::Positive => None,
    }
}

/// Apply a feedback adjustment to the current reasoning level.
///
/// Retry shifts off either extreme toward intermediate; at intermediate it
/// leaves the level alone (a retry wants different content, not different
/// depth).
pub fn adjust_reasoning_level(
    current: ReasoningLevel,
    adjustment: Option<ReasoningAdjustment>,
) -> ReasoningLevel {
    match adjustment {
        Some(ReasoningAdjustment::Simplify) => ReasoningLevel::Basic,
        Some(ReasoningAdjustment::Expand) => ReasoningLevel::Advanced,
        Some(ReasoningAdjustment::Retry) => match current {
            ReasoningLevel::Basic | ReasoningLevel::Advanced => ReasoningLevel::Intermediate,
            ReasoningLevel::Intermediate => ReasoningLevel::Intermediate,
        },
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> FeedbackAnalyzer {
        FeedbackAnalyzer::new().unwrap()
    }

    fn prior() -> SessionState {
        SessionState::new("tutor", "previous answer", ReasoningLevel::Advanced)
    }

    #[test]
    fn test_confused_maps_to_simplify() {
        let result = analyzer().analyze(
            "that's too complex, explain simpler",
            Some(&prior()),
            &[],
        );
        assert_eq!(result.feedback_type, Some(FeedbackType::Confused));
        assert_eq!(result.reasoning_adjustment, Some(ReasoningAdjustment::Simplify));
        assert!(result.score > 0.0);
    }

    #[test]
    fn test_positive_has_no_adjustment() {
        let result = analyzer().analyze("thanks, that helps a lot!", Some(&prior()), &[]);
        assert_eq!(result.feedback_type, Some(FeedbackType::Positive));
        assert_eq!(result.reasoning_adjustment, None);
    }

    #[test]
    fn test_retry_request() {
        let result = analyzer().analyze("that's wrong, try again", Some(&prior()), &[]);
        assert_eq!(result.feedback_type, Some(FeedbackType::Retry));
        assert_eq!(result.reasoning_adjustment, Some(ReasoningAdjustment::Retry));
    }

    #[test]
    fn test_expand_request() {
        let result = analyzer().analyze("interesting, tell me more about that", Some(&prior()), &[]);
        assert_eq!(result.feedback_type, Some(FeedbackType::Expand));
        assert_eq!(result.reasoning_adjustment, Some(ReasoningAdjustment::Expand));
    }

    #[test]
    fn test_no_prior_turn_is_neutral() {
        let result = analyzer().analyze("that's too complex, explain simpler", None, &[]);
        assert_eq!(result, FeedbackResult::none());
    }

    #[test]
    fn test_neutral_utterance() {
        let result = analyzer().analyze("how do lifetimes work in Rust?", Some(&prior()), &[]);
        assert_eq!(result.feedback_type, None);
        assert_eq!(result.reasoning_adjustment, None);
    }

    #[test]
    fn test_follow_up_detected_independently() {
        let result = analyzer().analyze("and what about generics?", Some(&prior()), &[]);
        assert!(result.follow_up_detected);
        assert_eq!(result.feedback_type, None);
    }

    #[test]
    fn test_adjust_reasoning_level() {
        use ReasoningAdjustment::*;
        use ReasoningLevel::*;

        assert_eq!(adjust_reasoning_level(Advanced, Some(Simplify)), Basic);
        assert_eq!(adjust_reasoning_level(Basic, Some(Expand)), Advanced);
        assert_eq!(adjust_reasoning_level(Advanced, Some(Retry)), Intermediate);
        assert_eq!(adjust_reasoning_level(Basic, Some(Retry)), Intermediate);
        assert_eq!(adjust_reasoning_level(Intermediate, Some(Retry)), Intermediate);
        assert_eq!(adjust_reasoning_level(Advanced, None), Advanced);
    }
}
