//! Planner error types.

use thiserror::Error;

/// Errors from planner construction.
///
/// Planning itself is infallible once the planner is built: extractor
/// failures degrade to neutral signals instead of surfacing.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("rule compilation failed: {0}")]
    Rule(#[from] regex::Error),

    #[error("signal extractor setup failed: {0}")]
    Signal(#[from] parley_signals::SignalError),

    #[error("invalid planner configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
