//! The response planner.
//!
//! Fuses the signal extractors, intent/domain/reasoning classifiers, and
//! memory context into a [`ResponsePlan`]. Planning never fails once the
//! planner is constructed; degraded inputs degrade the plan instead.

use regex::Regex;
use tracing::{debug, trace};

use parley_signals::{
    ClarificationDetector, FeedbackAnalyzer, GoalProgressDetector, adjust_reasoning_level,
};
use parley_types::{
    ClarificationResult, ContextualFactors, FeedbackResult, GoalProgressResult, Intent,
    MemoryContext, PlanStep, ResponsePlan, ResponseStrategy, SessionState, ToolSelection,
};

use crate::agents::AgentRegistry;
use crate::domain::{DomainRegistry, GENERAL_DOMAIN};
use crate::error::Result;
use crate::intent::{detect_intent, is_continuation_phrase, keyword_matches};
use crate::reasoning::ReasoningRules;

/// Base confidence before any boost.
pub const BASE_CONFIDENCE: f32 = 0.5;

/// Boost for a non-clarify intent on an utterance longer than 10 chars.
pub const LENGTH_BOOST: f32 = 0.2;

/// Boost when memory entries were recalled.
pub const MEMORY_BOOST: f32 = 0.1;

/// Boost per intent-keyword match.
pub const KEYWORD_BOOST: f32 = 0.1;

/// Cap on the cumulative keyword boost.
pub const KEYWORD_BOOST_CAP: f32 = 0.3;

/// Boost when the intent is in the agent's aligned set.
pub const ALIGNMENT_BOOST: f32 = 0.15;

/// Confidence pinned for a clarify intent.
pub const CLARIFY_CONFIDENCE: f32 = 0.3;

/// Caller-provided hints about how the turn was routed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutingMetadata {
    /// The caller already knows this turn continues the previous one.
    pub is_continuation: bool,
    /// The previous turn asked the user a clarifying question.
    pub answering_clarification: bool,
}

/// A plan plus the signal results that shaped it.
///
/// Callers persist the memory-worthy subset of the signals; the plan itself
/// goes to the renderer.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: ResponsePlan,
    pub feedback: FeedbackResult,
    pub clarification: ClarificationResult,
    pub goal_progress: GoalProgressResult,
}

/// Rule-based turn planner.
#[derive(Debug)]
pub struct Planner {
    agents: AgentRegistry,
    domains: DomainRegistry,
    feedback: FeedbackAnalyzer,
    clarification: ClarificationDetector,
    goal_progress: GoalProgressDetector,
    reasoning: ReasoningRules,
    cleaners: Vec<Regex>,
}

impl Planner {
    /// Build a planner with the default domain registry.
    pub fn new() -> Result<Self> {
        Self::with_domains(DomainRegistry::default())
    }

    /// Build a planner around a caller-supplied domain registry.
    pub fn with_domains(domains: DomainRegistry) -> Result<Self> {
        let cleaners = vec![
            // injected "[2024-01-01 12:00] ..." style prefixes
            Regex::new(r"\[[^\]]*\]\s*")?,
            // session continuation scaffolding
            Regex::new(r"(?i)^continuing from [^:]*:\s*")?,
            Regex::new(r"(?i)^\(resumed\)\s*")?,
        ];

        Ok(Self {
            agents: AgentRegistry,
            domains,
            feedback: FeedbackAnalyzer::new()?,
            clarification: ClarificationDetector::new()?,
            goal_progress: GoalProgressDetector::new()?,
            reasoning: ReasoningRules::new()?,
            cleaners,
        })
    }

    /// Strip memory/session artifacts injected upstream of the planner.
    fn clean_utterance(&self, utterance: &str) -> String {
        let mut cleaned = utterance.to_string();
        for cleaner in &self.cleaners {
            cleaned = cleaner.replace_all(&cleaned, "").into_owned();
        }
        cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Plan one turn.
    pub fn plan(
        &self,
        utterance: &str,
        agent_id: &str,
        session: Option<&SessionState>,
        memory: &MemoryContext,
        routing: RoutingMetadata,
    ) -> PlanOutcome {
        let clean = self.clean_utterance(utterance);
        let profile = self.agents.profile(agent_id);

        let feedback = self.feedback.analyze(&clean, session, &memory.entries);
        let clarification = self
            .clarification
            .detect(&clean, routing.answering_clarification);
        let goal_progress = self.goal_progress.detect(&clean, &memory.entries);

        let can_continue = routing.is_continuation || session.is_some();
        let is_continuation =
            routing.is_continuation || (can_continue && is_continuation_phrase(&clean));

        let intent = detect_intent(&clean, profile, can_continue, clarification.needed);
        let domain = self.domains.classify(&clean);

        let base_level = self
            .reasoning
            .detect(&clean, &memory.entries, &domain, &self.domains);
        let reasoning_level = adjust_reasoning_level(base_level, feedback.reasoning_adjustment);

        let confidence = self.confidence(&clean, intent, profile.aligned_intents, memory);

        let contextual_factors = ContextualFactors {
            has_goal_progress: goal_progress.fired(),
            needs_feedback_handling: feedback.feedback_type.is_some(),
            is_continuation,
            has_memory_context: !memory.entries.is_empty(),
        };

        let tools = self.tools(intent, domain.as_str(), reasoning_level, confidence, &clarification, &contextual_factors);
        let response_strategy = strategy(intent, confidence, &clarification, is_continuation);
        let plan_steps = plan_steps(response_strategy, &contextual_factors);

        trace!(
            agent_id,
            intent = intent.as_str(),
            domain = %domain,
            confidence,
            "turn planned"
        );

        PlanOutcome {
            plan: ResponsePlan {
                intent,
                domain,
                reasoning_level,
                confidence,
                tools,
                plan_steps,
                contextual_factors,
                response_strategy,
            },
            feedback,
            clarification,
            goal_progress,
        }
    }

    fn confidence(
        &self,
        clean: &str,
        intent: Intent,
        aligned: &[Intent],
        memory: &MemoryContext,
    ) -> f32 {
        if intent == Intent::Clarify {
            return CLARIFY_CONFIDENCE;
        }

        let mut confidence = BASE_CONFIDENCE;
        if clean.len() > 10 {
            confidence += LENGTH_BOOST;
        }
        if !memory.entries.is_empty() {
            confidence += MEMORY_BOOST;
        }

        let keyword_boost =
            (keyword_matches(clean, intent) as f32 * KEYWORD_BOOST).min(KEYWORD_BOOST_CAP);
        confidence += keyword_boost;

        if aligned.contains(&intent) {
            confidence += ALIGNMENT_BOOST;
        }

        confidence.min(1.0)
    }

    fn tools(
        &self,
        intent: Intent,
        domain: &str,
        reasoning: parley_types::ReasoningLevel,
        confidence: f32,
        clarification: &ClarificationResult,
        factors: &ContextualFactors,
    ) -> ToolSelection {
        use parley_types::ReasoningLevel;

        let use_memory =
            factors.has_memory_context || factors.is_continuation || factors.has_goal_progress;

        let use_knowledge = domain != GENERAL_DOMAIN
            && matches!(
                intent,
                Intent::Learn | Intent::Explain | Intent::Research | Intent::Analyze
            )
            && reasoning != ReasoningLevel::Basic;

        let use_search = matches!(intent, Intent::Research | Intent::Explore | Intent::Analyze)
            && confidence > 0.6
            && !factors.is_continuation;

        let ask_clarifying_questions = confidence < 0.9
            || intent == Intent::Clarify
            || (confidence < 0.95 && clarification.score > 0.0 && !factors.is_continuation);

        ToolSelection {
            use_memory,
            use_knowledge,
            use_search,
            ask_clarifying_questions,
        }
    }
}

fn strategy(
    intent: Intent,
    confidence: f32,
    clarification: &ClarificationResult,
    is_continuation: bool,
) -> ResponseStrategy {
    if clarification.needed || intent == Intent::Clarify || confidence < 0.9 {
        return ResponseStrategy::ClarificationFirst;
    }
    if is_continuation || confidence >= 0.9 {
        return ResponseStrategy::DirectAnswer;
    }
    if matches!(intent, Intent::Learn | Intent::Research) && confidence < 0.85 {
        return ResponseStrategy::StructuredFramework;
    }
    if matches!(intent, Intent::Create | Intent::Explore | Intent::Plan) {
        return ResponseStrategy::GuidedDiscovery;
    }
    ResponseStrategy::DirectAnswer
}

/// Ordered step list: acknowledgements first, then the strategy's steps.
fn plan_steps(strategy: ResponseStrategy, factors: &ContextualFactors) -> Vec<PlanStep> {
    let mut steps = Vec::new();
    if factors.needs_feedback_handling {
        steps.push(PlanStep::AcknowledgeFeedback);
    }
    if factors.has_goal_progress {
        steps.push(PlanStep::AcknowledgeGoalProgress);
    }

    match strategy {
        ResponseStrategy::ClarificationFirst => {
            steps.push(PlanStep::AskClarifyingQuestions);
            steps.push(PlanStep::ReferenceMemory);
            steps.push(PlanStep::ProvideFirstStep);
        }
        ResponseStrategy::StructuredFramework => {
            steps.push(PlanStep::PresentFramework);
            steps.push(PlanStep::WalkThroughSteps);
            steps.push(PlanStep::ProposeNextActions);
        }
        ResponseStrategy::GuidedDiscovery => {
            steps.push(PlanStep::ReferenceMemory);
            steps.push(PlanStep::OfferAlternatives);
            steps.push(PlanStep::ProposeNextActions);
        }
        ResponseStrategy::DirectAnswer => {
            steps.push(PlanStep::AnswerDirectly);
            steps.push(PlanStep::SuggestFollowUp);
        }
    }

    debug!(?strategy, steps = steps.len(), "plan steps assembled");
    steps
}
