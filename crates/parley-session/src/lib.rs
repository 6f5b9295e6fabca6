//! Per-user session state tracking for Parley.
//!
//! The tracker records the outcome of each user's previous turn (last agent,
//! last response text, last reasoning depth) so the planner can detect
//! continuations and react to feedback. State is ephemeral — process
//! lifetime only — and bounded by LRU eviction with optional TTL.

pub mod config;
pub mod tracker;

pub use config::{DEFAULT_MAX_USERS, DEFAULT_TTL, TrackerConfig};
pub use tracker::{SessionTracker, TrackerStats};
