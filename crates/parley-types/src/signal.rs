//! Typed results produced by the signal extractors.
//!
//! These are transient: produced and consumed within a single planning pass.
//! Only their memory-worthy subset is persisted back as new memory entries.

use serde::{Deserialize, Serialize};

use crate::memory::GoalStatus;

/// Sentiment category of user feedback about the previous response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Positive,
    Confused,
    Retry,
    Expand,
    Negative,
}

/// How the reasoning level should shift in response to feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningAdjustment {
    Simplify,
    Expand,
    Retry,
}

/// Result of analyzing the utterance for feedback about the prior turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResult {
    /// Winning feedback category, if any rule set scored above zero.
    pub feedback_type: Option<FeedbackType>,
    /// Score of the winning category.
    pub score: f32,
    /// Whether the utterance reads as a follow-up to the prior response.
    pub follow_up_detected: bool,
    /// Reasoning level adjustment implied by the feedback.
    pub reasoning_adjustment: Option<ReasoningAdjustment>,
}

impl FeedbackResult {
    /// A neutral result: no feedback signal detected.
    pub fn none() -> Self {
        Self {
            feedback_type: None,
            score: 0.0,
            follow_up_detected: false,
            reasoning_adjustment: None,
        }
    }
}

/// Ambiguity categories the clarification detector scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarificationCategory {
    VagueInput,
    MissingSubject,
    UnderspecifiedGoal,
    AmbiguousContext,
}

/// Result of checking whether the utterance needs clarification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationResult {
    /// Whether the cumulative score crossed the decision threshold.
    pub needed: bool,
    /// Cumulative ambiguity score.
    pub score: f32,
    /// Categories that contributed to the score.
    pub categories: Vec<ClarificationCategory>,
}

impl ClarificationResult {
    /// No clarification needed.
    pub fn none() -> Self {
        Self {
            needed: false,
            score: 0.0,
            categories: Vec::new(),
        }
    }
}

/// Result of detecting goal progress in the utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgressResult {
    /// Status fired by the detector, when confidence reached the threshold.
    pub status: Option<GoalStatus>,
    pub confidence: f32,
    /// Identifier of the open goal the utterance most likely refers to.
    pub goal_id: Option<String>,
    /// Summary of the matched goal.
    pub goal_summary: Option<String>,
}

impl GoalProgressResult {
    /// No goal progress detected.
    pub fn none() -> Self {
        Self {
            status: None,
            confidence: 0.0,
            goal_id: None,
            goal_summary: None,
        }
    }

    /// Whether a status fired.
    pub fn fired(&self) -> bool {
        self.status.is_some()
    }
}
