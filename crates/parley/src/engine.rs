//! The engine boundary.
//!
//! [`Engine`] wires the memory service, session tracker, and planner into
//! the three operations exposed to agent response generators: `plan`,
//! `recall`, and `remember`. Renderers report back through
//! [`Engine::record_response`] so the next turn sees the outcome.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use parley_memory::{FileStore, MemoryService, RecallOptions, SqliteStore};
use parley_planner::{LEVEL_TAG_PREFIX, PlanOutcome, Planner, RoutingMetadata};
use parley_session::{SessionTracker, TrackerConfig};
use parley_types::{MemoryContext, MemoryEntry, MemoryKind, ReasoningLevel, ResponsePlan};

use crate::error::Result;

/// Caller context for one planning turn.
#[derive(Debug, Clone, Default)]
pub struct PlanContext {
    pub agent_id: String,
    pub user_id: Option<String>,
    pub routing: RoutingMetadata,
}

impl PlanContext {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            user_id: None,
            routing: RoutingMetadata::default(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_routing(mut self, routing: RoutingMetadata) -> Self {
        self.routing = routing;
        self
    }
}

/// Memory-augmented dialogue planning engine.
///
/// One instance per process; cheap to share behind an `Arc`. All services
/// are constructor-injected, so tests compose engines from in-memory parts.
pub struct Engine {
    memory: MemoryService,
    sessions: SessionTracker,
    planner: Planner,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

impl Engine {
    /// Open an engine with durable storage under `data_dir`.
    ///
    /// The primary store is SQLite; a JSONL file in the same directory is
    /// the fallback tier when SQLite becomes unreachable.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let primary = SqliteStore::open(dir.join("parley.db"))?;
        let secondary = FileStore::open(dir.join("parley-fallback.jsonl"))?;
        let memory = MemoryService::from_backends(Arc::new(primary), Arc::new(secondary));

        info!(data_dir = %dir.display(), "Engine opened");
        Ok(Self::from_parts(
            memory,
            SessionTracker::new(TrackerConfig::default()),
            Planner::new()?,
        ))
    }

    /// Open an engine with no durable storage. Used by tests and demos.
    pub fn in_memory() -> Result<Self> {
        let primary = SqliteStore::open_in_memory()?;
        let secondary = SqliteStore::open_in_memory()?;
        let memory = MemoryService::from_backends(Arc::new(primary), Arc::new(secondary));

        Ok(Self::from_parts(
            memory,
            SessionTracker::new(TrackerConfig::default()),
            Planner::new()?,
        ))
    }

    /// Compose an engine from pre-built services.
    ///
    /// Hosts with their own domain vocabulary build the planner with
    /// [`Planner::with_domains`] and inject it here.
    pub fn from_parts(memory: MemoryService, sessions: SessionTracker, planner: Planner) -> Self {
        Self {
            memory,
            sessions,
            planner,
        }
    }

    /// Plan a response to one user turn.
    ///
    /// Never fails: storage and extractor problems degrade the plan rather
    /// than aborting the turn.
    pub async fn plan(&self, utterance: &str, ctx: &PlanContext) -> ResponsePlan {
        self.plan_outcome(utterance, ctx).await.plan
    }

    /// Plan a turn and return the signal results alongside the plan.
    pub async fn plan_outcome(&self, utterance: &str, ctx: &PlanContext) -> PlanOutcome {
        let options = RecallOptions::new().with_topic(utterance);
        let memory = self
            .memory
            .recall(&ctx.agent_id, ctx.user_id.as_deref(), &options);

        let session = match ctx.user_id.as_deref() {
            Some(user) => self.sessions.get_last_response(user).await,
            None => None,
        };

        let outcome = self.planner.plan(
            utterance,
            &ctx.agent_id,
            session.as_ref(),
            &memory,
            ctx.routing,
        );

        self.persist_signals(utterance, ctx, &outcome);

        debug!(
            agent_id = %ctx.agent_id,
            intent = outcome.plan.intent.as_str(),
            strategy = ?outcome.plan.response_strategy,
            input = preview(utterance),
            "Turn planned"
        );

        outcome
    }

    /// Recall ranked memories for an agent/user pair.
    pub async fn recall(
        &self,
        agent_id: &str,
        user_id: Option<&str>,
        options: &RecallOptions,
    ) -> MemoryContext {
        self.memory.recall(agent_id, user_id, options)
    }

    /// Persist a new memory entry.
    #[allow(clippy::too_many_arguments)]
    pub async fn remember(
        &self,
        agent_id: &str,
        user_id: Option<&str>,
        input: &str,
        summary: &str,
        context: Option<&str>,
        kind: MemoryKind,
        tags: Vec<String>,
    ) -> MemoryEntry {
        self.memory
            .remember(agent_id, user_id, input, summary, context, kind, tags)
    }

    /// Record the rendered response so the next turn can continue from it.
    pub async fn record_response(
        &self,
        user_id: &str,
        agent_id: &str,
        response: &str,
        reasoning_level: ReasoningLevel,
        continuation_context: Option<String>,
    ) {
        self.sessions
            .set_last_response(user_id, agent_id, response, reasoning_level, continuation_context)
            .await;
    }

    /// Access the session tracker (hosts run periodic cleanup).
    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    /// Access the memory service.
    pub fn memory(&self) -> &MemoryService {
        &self.memory
    }

    /// Persist the memory-worthy subset of a turn's signals.
    fn persist_signals(&self, utterance: &str, ctx: &PlanContext, outcome: &PlanOutcome) {
        let user = ctx.user_id.as_deref();

        if outcome.feedback.reasoning_adjustment.is_some() {
            let tag = format!("{LEVEL_TAG_PREFIX}{}", outcome.plan.reasoning_level.as_str());
            self.memory.remember(
                &ctx.agent_id,
                user,
                utterance,
                "reasoning level adjusted from user feedback",
                None,
                MemoryKind::Correction,
                vec![tag],
            );
        }

        if let Some(status) = outcome.goal_progress.status {
            let summary = outcome
                .goal_progress
                .goal_summary
                .clone()
                .unwrap_or_else(|| preview(utterance).to_string());
            let goal_id = outcome
                .goal_progress
                .goal_id
                .clone()
                .unwrap_or_else(|| parley_types::new_id().to_string());

            let mut entry =
                MemoryEntry::new(&ctx.agent_id, MemoryKind::GoalProgress, utterance, &summary)
                    .with_goal(goal_id, summary.clone(), status);
            if let Some(user) = user {
                entry = entry.with_user(user);
            }
            self.memory.remember_entry(&entry);
        }

        self.memory.remember(
            &ctx.agent_id,
            user,
            utterance,
            preview(utterance),
            None,
            MemoryKind::Conversation,
            vec![format!("intent:{}", outcome.plan.intent.as_str())],
        );
    }
}

/// First 80 characters, for log lines and turn summaries.
fn preview(input: &str) -> &str {
    match input.char_indices().nth(80) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::{GoalStatus, Intent, ResponseStrategy};

    fn engine() -> Engine {
        Engine::in_memory().unwrap()
    }

    #[tokio::test]
    async fn test_learn_to_code_plans_clarification_first() {
        let engine = engine();
        let ctx = PlanContext::new("assistant").with_user("u1");

        let plan = engine.plan("I want to learn to code", &ctx).await;

        assert_eq!(plan.intent, Intent::Learn);
        assert_eq!(plan.response_strategy, ResponseStrategy::ClarificationFirst);
    }

    #[tokio::test]
    async fn test_recorded_response_enables_continuation() {
        let engine = engine();
        let ctx = PlanContext::new("tutor").with_user("u1");

        engine
            .record_response("u1", "tutor", "lesson one", ReasoningLevel::Basic, None)
            .await;
        let plan = engine.plan("continue", &ctx).await;

        assert_eq!(plan.intent, Intent::Continue);
        assert!(plan.contextual_factors.is_continuation);
    }

    #[tokio::test]
    async fn test_remember_then_recall_round_trip() {
        let engine = engine();

        let stored = engine
            .remember(
                "tutor",
                Some("u1"),
                "i want to get better at rust",
                "user is learning rust",
                None,
                MemoryKind::Goal,
                vec!["rust".to_string()],
            )
            .await;

        let options = RecallOptions::new().with_topic("rust");
        let context = engine.recall("tutor", Some("u1"), &options).await;

        let found = context
            .entries
            .iter()
            .find(|e| e.id == stored.id)
            .unwrap_or_else(|| panic!("stored entry not recalled"));
        assert_eq!(found.input, stored.input);
        assert_eq!(found.summary, stored.summary);
        assert_eq!(found.tags, stored.tags);
    }

    #[tokio::test]
    async fn test_feedback_turn_persists_correction() {
        let engine = engine();
        let ctx = PlanContext::new("tutor").with_user("u1");

        engine
            .record_response(
                "u1",
                "tutor",
                "a very advanced answer",
                ReasoningLevel::Advanced,
                None,
            )
            .await;
        let before = engine.memory().count(Some("tutor"));
        engine
            .plan("that's too complex, explain simpler", &ctx)
            .await;

        // correction entry plus the turn log
        assert_eq!(engine.memory().count(Some("tutor")), before + 2);
    }

    #[tokio::test]
    async fn test_goal_progress_turn_persists_status() {
        let engine = engine();
        let ctx = PlanContext::new("tutor").with_user("u1");

        let goal = MemoryEntry::new(
            "tutor",
            MemoryKind::Goal,
            "i want to finish my portfolio website",
            "finish the portfolio website",
        )
        .with_user("u1")
        .with_goal(
            parley_types::new_id().to_string(),
            "finish the portfolio website",
            GoalStatus::InProgress,
        );
        engine.memory().remember_entry(&goal);

        let outcome = engine
            .plan_outcome("i finally finished the portfolio website", &ctx)
            .await;

        assert_eq!(outcome.goal_progress.status, Some(GoalStatus::Completed));

        let options = RecallOptions::new()
            .with_kinds(vec![MemoryKind::GoalProgress])
            .with_topic("portfolio");
        let recalled = engine.recall("tutor", Some("u1"), &options).await;
        assert!(
            recalled
                .entries
                .iter()
                .any(|e| e.goal_status == Some(GoalStatus::Completed))
        );
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let long = "é".repeat(100);
        assert_eq!(preview(&long).chars().count(), 80);
        assert_eq!(preview("short"), "short");
    }
}
