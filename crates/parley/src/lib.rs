//! Parley — a memory-augmented dialogue planning engine.
//!
//! Parley decides *how* an agent persona should answer a user turn, without
//! generating any text itself. Each turn flows through the engine:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                           parley                            │
//! │                                                             │
//! │  utterance ──► MemoryService.recall ──► ranked context      │
//! │            ──► SessionTracker.get ────► last-turn state     │
//! │            ──► Planner.plan ──────────► ResponsePlan        │
//! │                     │                                       │
//! │                     └─► memory-worthy signals persisted     │
//! │                                                             │
//! │  renderer ──► record_response ──► SessionTracker.set        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`ResponsePlan`] is the engine's sole output: a structured decision
//! (intent, domain, reasoning depth, tools, ordered steps, strategy) handed
//! to an out-of-process renderer.
//!
//! # Usage
//!
//! ```no_run
//! use parley::{Engine, PlanContext};
//!
//! #[tokio::main]
//! async fn main() -> parley::Result<()> {
//!     let engine = Engine::open("./data")?;
//!     let ctx = PlanContext::new("tutor").with_user("user-1");
//!
//!     let plan = engine.plan("I want to learn to code", &ctx).await;
//!     println!("{:?} via {:?}", plan.intent, plan.response_strategy);
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod error;
pub mod telemetry;

pub use engine::{Engine, PlanContext};
pub use error::{EngineError, Result};

// Re-export the boundary types callers handle.
pub use parley_memory::{MatchingMode, MemoryService, RecallOptions, StoreStats, TimeWindow};
pub use parley_planner::{DomainRegistry, DomainRule, Planner, RoutingMetadata};
pub use parley_session::{SessionTracker, TrackerConfig};
pub use parley_types::{
    Intent, MemoryContext, MemoryEntry, MemoryKind, PlanStep, ReasoningLevel, ResponsePlan,
    ResponseStrategy,
};
