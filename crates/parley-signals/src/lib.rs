//! Signal extraction for dialogue planning.
//!
//! Three extractors read the raw utterance (plus session and memory context)
//! and produce typed signals the planner consumes:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      parley-signals                      │
//! │                                                          │
//! │  utterance ──┬──► FeedbackAnalyzer ──► FeedbackResult    │
//! │              ├──► ClarificationDetector ──► Clarifi…     │
//! │              └──► GoalProgressDetector ──► GoalProgress… │
//! │                                                          │
//! │  shared: RuleSet (weighted regex + keyword tables)       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! All three extractors are pure after construction: compiling the rule
//! tables is the only fallible step, so a constructed extractor never
//! errors at detection time.
//!
//! # Usage
//!
//! ```no_run
//! use parley_signals::{ClarificationDetector, FeedbackAnalyzer, GoalProgressDetector};
//!
//! # fn main() -> parley_signals::Result<()> {
//! let feedback = FeedbackAnalyzer::new()?;
//! let clarification = ClarificationDetector::new()?;
//! let goals = GoalProgressDetector::new()?;
//!
//! let result = clarification.detect("help", false);
//! assert!(result.needed);
//! # Ok(())
//! # }
//! ```

pub mod clarification;
pub mod error;
pub mod feedback;
pub mod goal_progress;
pub mod rules;

pub use clarification::{CLARIFICATION_THRESHOLD, ClarificationDetector};
pub use error::{Result, SignalError};
pub use feedback::{FeedbackAnalyzer, adjust_reasoning_level};
pub use goal_progress::{GoalProgressDetector, OPEN_GOAL_BOOST, PROGRESS_THRESHOLD};
pub use rules::RuleSet;
