//! Engine error types.

use thiserror::Error;

/// Errors surfaced by the engine boundary.
///
/// Only setup can fail. Planning, recall, and remember degrade internally:
/// storage failures fall back, extractor failures become neutral signals.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("memory store setup failed: {0}")]
    Memory(#[from] parley_memory::MemoryError),

    #[error("planner setup failed: {0}")]
    Planner(#[from] parley_planner::PlannerError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
