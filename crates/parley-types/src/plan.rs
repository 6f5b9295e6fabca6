//! Response plan types — the engine's structured decision artifact.

use serde::{Deserialize, Serialize};

/// What the user is asking the agent to do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Learn,
    Analyze,
    Optimize,
    Create,
    Summarize,
    Compare,
    Explain,
    Explore,
    Debug,
    Plan,
    Research,
    Automate,
    /// The utterance is too ambiguous to act on.
    Clarify,
    /// The utterance continues the previous turn.
    Continue,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learn => "learn",
            Self::Analyze => "analyze",
            Self::Optimize => "optimize",
            Self::Create => "create",
            Self::Summarize => "summarize",
            Self::Compare => "compare",
            Self::Explain => "explain",
            Self::Explore => "explore",
            Self::Debug => "debug",
            Self::Plan => "plan",
            Self::Research => "research",
            Self::Automate => "automate",
            Self::Clarify => "clarify",
            Self::Continue => "continue",
        }
    }
}

/// Depth of reasoning the response should be rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningLevel {
    Basic,
    Intermediate,
    Advanced,
}

impl ReasoningLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

/// Overall shape of the response the renderer should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStrategy {
    DirectAnswer,
    GuidedDiscovery,
    StructuredFramework,
    ClarificationFirst,
}

/// Supporting tools the renderer should invoke, as independent flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSelection {
    pub use_memory: bool,
    pub use_knowledge: bool,
    pub use_search: bool,
    pub ask_clarifying_questions: bool,
}

/// Cross-cutting observations fused from the signal extractors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextualFactors {
    pub has_goal_progress: bool,
    pub needs_feedback_handling: bool,
    pub is_continuation: bool,
    pub has_memory_context: bool,
}

/// Abstract step tags emitted in plan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStep {
    AcknowledgeFeedback,
    AcknowledgeGoalProgress,
    AskClarifyingQuestions,
    ReferenceMemory,
    ProvideFirstStep,
    PresentFramework,
    WalkThroughSteps,
    OfferAlternatives,
    ProposeNextActions,
    AnswerDirectly,
    SuggestFollowUp,
}

/// The engine's sole output: a structured decision consumed by downstream
/// response renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsePlan {
    pub intent: Intent,
    /// Free-form domain classifier label (e.g., "programming", "general").
    pub domain: String,
    pub reasoning_level: ReasoningLevel,
    /// Planner confidence in [0, 1].
    pub confidence: f32,
    pub tools: ToolSelection,
    pub plan_steps: Vec<PlanStep>,
    pub contextual_factors: ContextualFactors,
    pub response_strategy: ResponseStrategy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasoning_level_ordering() {
        assert!(ReasoningLevel::Basic < ReasoningLevel::Intermediate);
        assert!(ReasoningLevel::Intermediate < ReasoningLevel::Advanced);
    }

    #[test]
    fn test_intent_serde_names() {
        let json = serde_json::to_string(&Intent::Continue).unwrap();
        assert_eq!(json, "\"continue\"");
        let back: Intent = serde_json::from_str("\"learn\"").unwrap();
        assert_eq!(back, Intent::Learn);
    }

    #[test]
    fn test_plan_serializes() {
        let plan = ResponsePlan {
            intent: Intent::Learn,
            domain: "programming".to_string(),
            reasoning_level: ReasoningLevel::Intermediate,
            confidence: 0.7,
            tools: ToolSelection::default(),
            plan_steps: vec![PlanStep::AskClarifyingQuestions, PlanStep::ReferenceMemory],
            contextual_factors: ContextualFactors::default(),
            response_strategy: ResponseStrategy::ClarificationFirst,
        };

        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"clarification_first\""));
        assert!(json.contains("\"ask_clarifying_questions\""));
    }
}
