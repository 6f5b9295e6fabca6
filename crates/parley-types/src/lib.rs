//! Shared types for the Parley dialogue planning engine.
//!
//! Every crate in the workspace speaks these types: memory entries and their
//! recall contexts, per-user session state, the signal extractor results, and
//! the [`ResponsePlan`] the planner emits as the engine's sole output.

pub mod memory;
pub mod plan;
pub mod session;
pub mod signal;

pub use memory::{GoalStatus, MemoryContext, MemoryEntry, MemoryKind, MemoryPattern};
pub use plan::{
    ContextualFactors, Intent, PlanStep, ReasoningLevel, ResponsePlan, ResponseStrategy,
    ToolSelection,
};
pub use session::SessionState;
pub use signal::{
    ClarificationCategory, ClarificationResult, FeedbackResult, FeedbackType, GoalProgressResult,
    ReasoningAdjustment,
};

/// Identifier type used for memory entries.
pub type Id = uuid::Uuid;

/// Timestamp type used throughout the engine.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a new unique identifier.
pub fn new_id() -> Id {
    uuid::Uuid::new_v4()
}

/// Current UTC time.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}
