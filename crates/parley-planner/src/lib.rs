//! Rule-based response planning.
//!
//! The planner fuses everything the engine knows about a turn into a single
//! structured decision:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       parley-planner                       │
//! │                                                            │
//! │  utterance ──► clean ──► intent ───┐                       │
//! │  session ────► signals ────────────┤                       │
//! │  memory ─────► reasoning/domain ───┼──► ResponsePlan       │
//! │  routing ────► continuation ───────┘   (+ signal results)  │
//! │                                                            │
//! │  agents: persona profiles    domains: injected registry    │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Construction compiles every rule table and is the only fallible step;
//! [`Planner::plan`] itself never fails.
//!
//! # Usage
//!
//! ```no_run
//! use parley_planner::{Planner, RoutingMetadata};
//! use parley_types::MemoryContext;
//!
//! # fn main() -> parley_planner::Result<()> {
//! let planner = Planner::new()?;
//! let outcome = planner.plan(
//!     "I want to learn to code",
//!     "tutor",
//!     None,
//!     &MemoryContext::empty(),
//!     RoutingMetadata::default(),
//! );
//! println!("{:?}", outcome.plan.response_strategy);
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod domain;
pub mod error;
pub mod intent;
pub mod planner;
pub mod reasoning;

pub use agents::{AgentProfile, AgentRegistry, AgentRule};
pub use domain::{DomainRegistry, DomainRule, GENERAL_DOMAIN};
pub use error::{PlannerError, Result};
pub use planner::{PlanOutcome, Planner, RoutingMetadata};
pub use reasoning::LEVEL_TAG_PREFIX;
